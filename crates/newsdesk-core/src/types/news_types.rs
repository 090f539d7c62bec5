//! News record types

use super::{Document, Fields};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection the panel reads and writes by default
pub const NEWS_COLLECTION: &str = "news";

/// Field keys as they appear in stored documents
pub mod field {
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const AUTHOR_ID: &str = "authorId";
    pub const CREATED_AT: &str = "createdAt";
}

/// A news record as shown by the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: String,
}

impl NewsItem {
    /// Build a news item from a stored document.
    ///
    /// Missing or non-string fields decode as empty strings.
    pub fn from_document(doc: &Document) -> Self {
        let text = |key: &str| doc.str_field(key).unwrap_or_default().to_string();
        Self {
            id: doc.id.clone(),
            title: text(field::TITLE),
            content: text(field::CONTENT),
            author_id: text(field::AUTHOR_ID),
            created_at: text(field::CREATED_AT),
        }
    }

    /// Creation time, when `created_at` holds a valid RFC 3339 timestamp
    pub fn created_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl From<Document> for NewsItem {
    fn from(doc: Document) -> Self {
        Self::from_document(&doc)
    }
}

/// Payload of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: String,
}

impl NewsDraft {
    /// Create a draft stamped with the current time
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self::at(title, content, author_id, Utc::now())
    }

    /// Create a draft stamped with the given time
    pub fn at(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_id: author_id.into(),
            created_at: format_timestamp(created_at),
        }
    }

    /// Convert into the document body written to the store
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(field::TITLE.to_string(), Value::String(self.title));
        fields.insert(field::CONTENT.to_string(), Value::String(self.content));
        fields.insert(field::AUTHOR_ID.to_string(), Value::String(self.author_id));
        fields.insert(field::CREATED_AT.to_string(), Value::String(self.created_at));
        fields
    }
}

/// How the panel orders the list after a fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOrder {
    /// Whatever order the store returned
    #[default]
    Store,
    /// Most recent `created_at` first
    NewestFirst,
    /// Oldest `created_at` first
    OldestFirst,
}

impl ListOrder {
    /// Reorder items in place.
    ///
    /// Items whose timestamp does not parse sort as the oldest; ties keep
    /// the store's order.
    pub fn apply(self, items: &mut [NewsItem]) {
        match self {
            Self::Store => {}
            Self::NewestFirst => {
                items.sort_by(|a, b| b.created_at_time().cmp(&a.created_at_time()))
            }
            Self::OldestFirst => {
                items.sort_by(|a, b| a.created_at_time().cmp(&b.created_at_time()))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::NewestFirst => "newest-first",
            Self::OldestFirst => "oldest-first",
        }
    }
}

impl std::str::FromStr for ListOrder {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Self::Store),
            "newest-first" | "newest" => Ok(Self::NewestFirst),
            "oldest-first" | "oldest" => Ok(Self::OldestFirst),
            other => Err(crate::error::ConfigError::Invalid {
                key: "order",
                value: other.to_string(),
            }),
        }
    }
}

/// Format a timestamp the way stored news records carry it
/// (`2024-05-01T12:30:00.000Z`)
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

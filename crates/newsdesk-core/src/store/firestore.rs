//! Hosted document store reached through the Firestore REST API
//!
//! Documents are exchanged as typed Firestore values (`stringValue`,
//! `integerValue`, `mapValue`, ...) and converted to and from plain JSON at
//! this boundary, so the rest of the crate only ever sees `Fields`.

use super::DocumentStore;
use crate::auth::IdentityProvider;
use crate::error::{Result, StoreError};
use crate::types::{Document, Fields};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";
const PAGE_SIZE: u32 = 300;

/// Connection settings for a Firestore project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// REST root, overridable to point at an emulator
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            database: default_database(),
            endpoint: default_endpoint(),
        }
    }

    /// URL of a collection's documents
    pub fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.endpoint.trim_end_matches('/'),
            self.project_id,
            self.database,
            collection
        )
    }

    /// URL of a single document
    pub fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }
}

/// Firestore-backed `DocumentStore`
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
    identity: Arc<dyn IdentityProvider>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        info!(
            "Firestore store for project {} ({})",
            config.project_id, config.database
        );
        Self {
            client: reqwest::Client::new(),
            config,
            identity,
        }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Attach the API key and the signed-in user's token, renewing the
    /// token first if it has lapsed
    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        self.identity.refresh().await?;

        let request = if self.config.api_key.is_empty() {
            request
        } else {
            request.query(&[("key", self.config.api_key.as_str())])
        };

        Ok(match self.identity.current_user().and_then(|u| u.id_token) {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RemoteDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RemoteDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RemoteDocument {
    fn into_document(self) -> Result<Document> {
        let id = document_id(&self.name)
            .ok_or_else(|| StoreError::Malformed(format!("document name {:?}", self.name)))?
            .to_string();
        Ok(Document::new(id, decode_fields(&self.fields)))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Turn a non-2xx response into a `Rejected` error carrying the server message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
    .into())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let url = self.config.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .authorize(self.client.get(&url))
                .await?
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = check_status(request.send().await?).await?.json().await?;
            for remote in page.documents {
                documents.push(remote.into_document()?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Fetched {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let body = RemoteDocument {
            name: String::new(),
            fields: encode_fields(&fields),
        };

        let request = self
            .authorize(self.client.post(self.config.collection_url(collection)))
            .await?
            .json(&body);
        let created: RemoteDocument = check_status(request.send().await?).await?.json().await?;

        let doc = created.into_document()?;
        debug!("Created document {}", doc.id);
        Ok(doc.id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let request = self
            .authorize(self.client.delete(self.config.document_url(collection, id)))
            .await?;
        check_status(request.send().await?).await?;
        debug!("Deleted document {}", id);
        Ok(())
    }
}

/// Last path segment of a full document name
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Encode plain JSON fields as Firestore typed values
pub(crate) fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode Firestore typed values into plain JSON fields
pub(crate) fn decode_fields(fields: &Map<String, Value>) -> Fields {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        },
        "doubleValue" | "booleanValue" | "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalIdentity;
    use crate::types::NewsDraft;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_urls() {
        let config = FirestoreConfig::new("demo-project", "key");
        assert_eq!(
            config.collection_url("news"),
            "https://firestore.googleapis.com/v1/projects/demo-project/databases/(default)/documents/news"
        );

        let emulator = FirestoreConfig {
            endpoint: "http://localhost:8080/v1/".to_string(),
            ..config
        };
        assert_eq!(
            emulator.document_url("news", "abc"),
            "http://localhost:8080/v1/projects/demo-project/databases/(default)/documents/news/abc"
        );
    }

    #[test]
    fn test_news_fields_encode_as_string_values() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let fields = NewsDraft::at("Good news", "Something nice happened", "u1", at).into_fields();

        let encoded = Value::Object(encode_fields(&fields));
        assert_eq!(
            encoded,
            json!({
                "title": { "stringValue": "Good news" },
                "content": { "stringValue": "Something nice happened" },
                "authorId": { "stringValue": "u1" },
                "createdAt": { "stringValue": "2024-05-01T12:30:00.000Z" },
            })
        );
        assert_eq!(decode_fields(&encode_fields(&fields)), fields);
    }

    #[test]
    fn test_decode_nested_and_numeric_values() {
        let remote = json!({
            "views": { "integerValue": "42" },
            "score": { "doubleValue": 0.5 },
            "tags": { "arrayValue": { "values": [{ "stringValue": "good" }] } },
            "empty": { "arrayValue": {} },
            "meta": { "mapValue": { "fields": { "pinned": { "booleanValue": true } } } },
            "published": { "timestampValue": "2024-05-01T12:30:00Z" },
            "nothing": { "nullValue": null },
        });

        let decoded = Value::Object(decode_fields(remote.as_object().unwrap()));
        assert_eq!(
            decoded,
            json!({
                "views": 42,
                "score": 0.5,
                "tags": ["good"],
                "empty": [],
                "meta": { "pinned": true },
                "published": "2024-05-01T12:30:00Z",
                "nothing": null,
            })
        );
    }

    #[test]
    fn test_remote_document_id_from_name() {
        let remote: RemoteDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/news/Xy12",
            "fields": { "title": { "stringValue": "Hi" } },
            "createTime": "2024-05-01T12:30:00Z",
        }))
        .unwrap();

        let doc = remote.into_document().unwrap();
        assert_eq!(doc.id, "Xy12");
        assert_eq!(doc.str_field("title"), Some("Hi"));

        let nameless = RemoteDocument {
            name: String::new(),
            fields: Map::new(),
        };
        assert!(nameless.into_document().is_err());
    }

    #[test]
    fn test_list_response_tolerates_empty_collection() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_store_keeps_config() {
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentity::new("admin"));
        let store = FirestoreStore::new(FirestoreConfig::new("p", ""), identity);
        assert_eq!(store.config().database, "(default)");
    }
}

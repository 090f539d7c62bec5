//! Signed-in user

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are renewed this long before they actually lapse
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The user an identity provider reports as signed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, stamped on created records
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Bearer token for the hosted store, when the provider issued one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Long-lived token used to obtain a new `id_token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When `id_token` stops being accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl User {
    /// A user known only by id
    pub fn local(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            id_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Name to show in the front end
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    /// Whether the token is past (or about to pass) its expiry.
    ///
    /// Users without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now + Duration::seconds(EXPIRY_MARGIN_SECS))
    }
}

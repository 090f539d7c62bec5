//! Email/password sign-in against the Firebase Identity Toolkit REST API
//!
//! ID tokens last about an hour; `FirebaseAuth::refresh` trades the refresh
//! token for a new one through the Secure Token endpoint.

use crate::error::{AuthError, ConfigError, Result};
use crate::types::User;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";

/// Settings for the Firebase identity endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseAuthConfig {
    pub api_key: String,
    /// REST root, overridable to point at the auth emulator
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Secure Token REST root
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

impl FirebaseAuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_endpoint(),
            token_endpoint: default_token_endpoint(),
        }
    }

    fn sign_in_url(&self) -> String {
        format!(
            "{}/accounts:signInWithPassword",
            self.endpoint.trim_end_matches('/')
        )
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.token_endpoint.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    /// Seconds, sent as a string
    expires_in: Option<String>,
}

impl SignInResponse {
    fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|n| !n.is_empty()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expiry(now, self.expires_in.as_deref()),
        }
    }
}

/// Secure Token replies use snake_case keys
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

fn expiry(now: DateTime<Utc>, expires_in: Option<&str>) -> Option<DateTime<Utc>> {
    expires_in
        .and_then(|secs| secs.parse::<i64>().ok())
        .map(|secs| now + Duration::seconds(secs))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Firebase password sign-in client
#[derive(Debug)]
pub struct FirebaseAuth {
    client: reqwest::Client,
    config: FirebaseAuthConfig,
}

impl FirebaseAuth {
    pub fn new(config: FirebaseAuthConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ConfigError::Missing("apiKey").into());
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// Exchange an email and password for a signed-in user
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        debug!("Signing in {}", email);

        let request = self
            .client
            .post(self.config.sign_in_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            });
        let body: SignInResponse = send(request, "Sign-in").await?;
        Ok(body.into_user(Utc::now()))
    }

    /// Renew the user's ID token with their refresh token
    pub async fn refresh(&self, user: &User) -> Result<User> {
        let Some(refresh_token) = user.refresh_token.as_deref() else {
            return Err(AuthError::SessionExpired("no refresh token".to_string()).into());
        };

        let request = self
            .client
            .post(self.config.token_url())
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ]);
        let body: RefreshResponse = send(request, "Token refresh").await?;

        info!("Renewed sign-in for {}", user.label());
        Ok(User {
            id_token: Some(body.id_token),
            refresh_token: Some(body.refresh_token),
            expires_at: expiry(Utc::now(), body.expires_in.as_deref()),
            ..user.clone()
        })
    }
}

async fn send<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    action: &str,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| AuthError::Request(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| AuthError::Request(e.to_string()).into());
    }

    let body = response.text().await.unwrap_or_default();
    warn!("{} rejected with status {}", action, status);
    Err(classify_failure(status.as_u16(), &body).into())
}

/// Firebase reports credential problems as 400 with a code message
fn classify_failure(status: u16, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    let credential_codes = [
        "EMAIL_NOT_FOUND",
        "INVALID_PASSWORD",
        "INVALID_LOGIN_CREDENTIALS",
        "USER_DISABLED",
        "INVALID_EMAIL",
    ];
    let session_codes = ["TOKEN_EXPIRED", "INVALID_REFRESH_TOKEN", "USER_NOT_FOUND"];

    if status == 400 && credential_codes.iter().any(|c| message.starts_with(c)) {
        AuthError::InvalidCredentials(message)
    } else if status == 400 && session_codes.iter().any(|c| message.starts_with(c)) {
        AuthError::SessionExpired(message)
    } else {
        AuthError::Request(format!("{} ({})", message, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let config = FirebaseAuthConfig::new("k");
        assert_eq!(
            config.sign_in_url(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
        );
        assert_eq!(config.token_url(), "https://securetoken.googleapis.com/v1/token");
    }

    #[test]
    fn test_missing_api_key_rejected() {
        assert!(FirebaseAuth::new(FirebaseAuthConfig::new("")).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SignInRequest {
            email: "a@b.c",
            password: "pw",
            return_secure_token: true,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "email": "a@b.c", "password": "pw", "returnSecureToken": true })
        );
    }

    #[test]
    fn test_response_into_user() {
        let resp: SignInResponse = serde_json::from_value(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-9",
            "email": "editor@example.com",
            "displayName": "",
            "idToken": "tok",
            "registered": true,
            "refreshToken": "r",
            "expiresIn": "3600",
        }))
        .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let user = resp.into_user(now);
        assert_eq!(user.id, "uid-9");
        assert_eq!(user.display_name, None);
        assert_eq!(user.label(), "editor@example.com");
        assert_eq!(user.id_token.as_deref(), Some("tok"));
        assert_eq!(user.refresh_token.as_deref(), Some("r"));
        assert_eq!(user.expires_at, Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_classify_failure() {
        let body = r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#;
        assert!(matches!(
            classify_failure(400, body),
            AuthError::InvalidCredentials(m) if m == "INVALID_PASSWORD"
        ));

        let body = r#"{"error":{"code":400,"message":"TOKEN_EXPIRED","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(classify_failure(400, body), AuthError::SessionExpired(_)));

        assert!(matches!(
            classify_failure(503, "unavailable"),
            AuthError::Request(m) if m == "unavailable (503)"
        ));
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_expired() {
        let auth = FirebaseAuth::new(FirebaseAuthConfig::new("k")).unwrap();
        let err = auth.refresh(&User::local("u1")).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Auth(AuthError::SessionExpired(_))
        ));
    }
}

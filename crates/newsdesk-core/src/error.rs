//! Error types for NewsDesk Core

use thiserror::Error;

/// Main error type for NewsDesk operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Identity provider errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Sign-in expired, sign in again: {0}")]
    SessionExpired(String),

    #[error("Sign-in request failed: {0}")]
    Request(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(StoreError::Database(err.to_string()))
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::Store(StoreError::Pool(err.to_string()))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Store(StoreError::Request(err.to_string()))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Blocking task failed: {}", err))
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

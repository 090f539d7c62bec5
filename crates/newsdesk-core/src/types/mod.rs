//! Core type definitions for NewsDesk
//!
//! This module contains the shared types used across the application:
//! the raw document shape exchanged with stores, the news record built on
//! top of it, and the signed-in user.

mod news_types;
mod user_types;

pub use news_types::*;
pub use user_types::*;

use serde::{Deserialize, Serialize};

/// Field map of a stored document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document as returned by a store listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier assigned by the store
    pub id: String,
    /// Document body
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a string field, if present and a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

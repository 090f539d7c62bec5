//! NewsDesk Core Library
//!
//! This crate provides the core functionality for NewsDesk, including:
//! - The `NewsPanel` controller (form fields, cached list, create/delete)
//! - Document store collaborators (SQLite, in-memory, Firestore REST)
//! - Identity collaborators (local user, Firebase password sign-in)
//! - Toast notification sinks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     newsdesk-core                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  panel.rs      - NewsPanel: fetch, submit, delete           │
//! │  store/        - DocumentStore trait and backends           │
//! │  auth/         - IdentityProvider, sessions, Firebase       │
//! │  notify.rs     - Notifier trait, toast queue                │
//! │  config.rs     - Settings file and overrides                │
//! │  types/        - Shared type definitions                    │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod panel;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

pub use auth::{FirebaseAuth, FirebaseAuthConfig, IdentityProvider, LocalIdentity, Session};
pub use config::{BackendKind, Config, Overrides};
pub use notify::{Fanout, Notifier, Toast, ToastLevel, ToastQueue, TracingNotifier};
pub use panel::{DeleteOutcome, FormField, NewsPanel, SubmitOutcome};
pub use store::{DocumentStore, FirestoreConfig, FirestoreStore, MemoryStore, SqliteStore};

//! NewsDesk UI Library
//!
//! Terminal front end for NewsDesk: one-shot commands and an interactive
//! panel, both driving `newsdesk_core::NewsPanel`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ cli.rs        Cli (clap) ── execute ──┐                  │
//! │                                       ▼                  │
//! │ console.rs    line editor loop ──► model.rs (NewsModel)  │
//! │ commands.rs   ConsoleCommand           │ block_on        │
//! │ render.rs     text layout              ▼                 │
//! │ services.rs   store + identity + toasts ──► NewsPanel    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod console;
pub mod model;
pub mod render;
pub mod services;

// Re-exports
pub use cli::{Cli, Commands};
pub use commands::ConsoleCommand;
pub use model::NewsModel;
pub use services::Services;

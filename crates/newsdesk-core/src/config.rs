//! Application configuration
//!
//! Settings come from a JSON file (`~/.config/newsdesk/config.json` unless a
//! path is given) layered over built-in defaults. Front ends apply their own
//! overrides on top with `Overrides`.

use crate::auth::FirebaseAuthConfig;
use crate::error::{ConfigError, Result};
use crate::notify::ToastQueue;
use crate::store::FirestoreConfig;
use crate::types::{ListOrder, NEWS_COLLECTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "newsdesk";

/// Largest accepted `toastCapacity`
pub const MAX_TOAST_CAPACITY: usize = 100;

/// Which document store the panel talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Memory,
    Firestore,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
            Self::Firestore => "firestore",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            other => Err(ConfigError::Invalid {
                key: "backend",
                value: other.to_string(),
            }),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub backend: BackendKind,
    /// SQLite database file; defaults under the user data directory
    pub database_path: Option<PathBuf>,
    pub collection: String,
    pub order: ListOrder,
    /// User stamped on records when no sign-in provider is configured
    pub user_id: String,
    pub toast_capacity: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    pub firestore: Option<FirestoreConfig>,
    /// Identity endpoint; derived from the Firestore API key when absent
    pub auth: Option<FirebaseAuthConfig>,
    /// Where a Firebase sign-in is remembered
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_path: None,
            collection: NEWS_COLLECTION.to_string(),
            order: ListOrder::default(),
            user_id: "admin".to_string(),
            toast_capacity: ToastQueue::DEFAULT_CAPACITY,
            log_filter: None,
            firestore: None,
            auth: None,
            session_path: None,
        }
    }
}

/// Values supplied by the front end that win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<BackendKind>,
    pub database_path: Option<PathBuf>,
    pub user_id: Option<String>,
    pub order: Option<ListOrder>,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.json"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Layer front-end overrides on top
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(path) = overrides.database_path {
            self.database_path = Some(path);
        }
        if let Some(user_id) = overrides.user_id {
            self.user_id = user_id;
        }
        if let Some(order) = overrides.order {
            self.order = order;
        }
        self
    }

    /// Check the settings the selected backend depends on
    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::Missing("collection").into());
        }
        if !(1..=MAX_TOAST_CAPACITY).contains(&self.toast_capacity) {
            return Err(ConfigError::Invalid {
                key: "toastCapacity",
                value: self.toast_capacity.to_string(),
            }
            .into());
        }
        if self.backend == BackendKind::Firestore {
            let firestore = self
                .firestore
                .as_ref()
                .ok_or(ConfigError::Missing("firestore"))?;
            if firestore.project_id.is_empty() {
                return Err(ConfigError::Missing("firestore.projectId").into());
            }
            if firestore.api_key.is_empty() {
                return Err(ConfigError::Missing("firestore.apiKey").into());
            }
        } else if self.user_id.trim().is_empty() {
            return Err(ConfigError::Missing("userId").into());
        }
        Ok(())
    }

    /// Settings for Firebase sign-in, if any are known
    pub fn auth_config(&self) -> Option<FirebaseAuthConfig> {
        self.auth.clone().or_else(|| {
            self.firestore
                .as_ref()
                .filter(|f| !f.api_key.is_empty())
                .map(|f| FirebaseAuthConfig::new(f.api_key.clone()))
        })
    }

    /// Resolved SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join("newsdesk.db"))
    }

    /// Resolved sign-in session file
    pub fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| data_dir().join("session.json"))
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

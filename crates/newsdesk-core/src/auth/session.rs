//! Sign-in session

use super::{FirebaseAuth, IdentityProvider};
use crate::error::{ConfigError, Result};
use crate::types::User;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Holds the signed-in user, optionally mirrored to a JSON file.
///
/// The file carries bearer and refresh tokens, so on unix it is kept
/// readable by the owner only.
#[derive(Debug, Default)]
pub struct Session {
    user: RwLock<Option<User>>,
    path: Option<PathBuf>,
    refresher: Option<FirebaseAuth>,
}

impl Session {
    /// A session that lives only in memory
    pub fn new() -> Self {
        Self::default()
    }

    /// A session backed by a file; a previously saved user is restored
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let user = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let user: User = serde_json::from_str(&raw)?;
            debug!("Restored session for {}", user.id);
            Some(user)
        } else {
            None
        };

        Ok(Self {
            user: RwLock::new(user),
            path: Some(path),
            refresher: None,
        })
    }

    /// Renew lapsed tokens through this client
    pub fn with_refresher(mut self, auth: FirebaseAuth) -> Self {
        self.refresher = Some(auth);
        self
    }

    /// Record a signed-in user
    pub fn sign_in(&self, user: User) -> Result<()> {
        info!("Signed in as {}", user.label());
        self.persist(&user)?;
        *self.user.write() = Some(user);
        Ok(())
    }

    /// Forget the signed-in user
    pub fn sign_out(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        if let Some(user) = self.user.write().take() {
            info!("Signed out {}", user.label());
        }
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }

    fn persist(&self, user: &User) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        // `mode` only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(serde_json::to_string_pretty(user)?.as_bytes())?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for Session {
    fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .as_ref()
            .filter(|user| !user.is_expired(Utc::now()))
            .cloned()
    }

    async fn refresh(&self) -> Result<()> {
        let Some(auth) = &self.refresher else {
            return Ok(());
        };
        let stale = self
            .user
            .read()
            .as_ref()
            .filter(|user| user.is_expired(Utc::now()) && user.refresh_token.is_some())
            .cloned();
        let Some(stale) = stale else {
            return Ok(());
        };

        debug!("Token for {} has lapsed, renewing", stale.label());
        let renewed = auth.refresh(&stale).await.inspect_err(|e| {
            warn!("Could not renew sign-in for {}: {}", stale.label(), e);
        })?;
        self.persist(&renewed)?;
        *self.user.write() = Some(renewed);
        Ok(())
    }
}

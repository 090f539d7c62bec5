//! Identity collaborators
//!
//! The panel only needs to know who is signed in so it can stamp new
//! records. This module provides:
//! - The `IdentityProvider` trait
//! - `LocalIdentity`, a fixed user taken from configuration
//! - `Session`, a sign-in slot that can be persisted between runs
//! - `FirebaseAuth`, email/password sign-in against Firebase

mod firebase;
mod session;

pub use firebase::{FirebaseAuth, FirebaseAuthConfig};
pub use session::Session;

use crate::error::Result;
use crate::types::User;
use async_trait::async_trait;

/// Supplies the currently signed-in user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is signed in or the
    /// sign-in has lapsed
    fn current_user(&self) -> Option<User>;

    /// Renew short-lived credentials before they are handed out
    async fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

/// Always reports the same user
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    user: User,
}

impl LocalIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user: User::local(user_id),
        }
    }

    pub fn from_user(user: User) -> Self {
        Self { user }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<User> {
        Some(self.user.clone())
    }
}

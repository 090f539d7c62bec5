//! Collaborator wiring
//!
//! Picks the document store and identity provider named by the config and
//! hands out panels bound to them.

use anyhow::{Context, Result};
use newsdesk_core::{
    BackendKind, Config, DocumentStore, Fanout, FirebaseAuth, FirestoreStore, IdentityProvider,
    LocalIdentity, MemoryStore, NewsPanel, Notifier, Session, SqliteStore, ToastQueue,
    TracingNotifier,
};
use std::sync::Arc;
use tracing::info;

/// Backend services shared by every front-end command
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Present when sign-in goes through Firebase
    pub session: Option<Arc<Session>>,
    pub toasts: Arc<ToastQueue>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let toasts = Arc::new(ToastQueue::new(config.toast_capacity));

        let services = match config.backend {
            BackendKind::Sqlite => {
                let store = SqliteStore::from_path(config.database_path())
                    .context("failed to open the local news database")?;
                Self {
                    store: Arc::new(store),
                    identity: Arc::new(LocalIdentity::new(config.user_id.clone())),
                    session: None,
                    toasts,
                }
            }
            BackendKind::Memory => Self {
                store: Arc::new(MemoryStore::new()),
                identity: Arc::new(LocalIdentity::new(config.user_id.clone())),
                session: None,
                toasts,
            },
            BackendKind::Firestore => {
                let mut session =
                    Session::load(config.session_path()).context("failed to restore sign-in")?;
                if let Some(auth_config) = config.auth_config() {
                    session = session.with_refresher(FirebaseAuth::new(auth_config)?);
                }
                let session = Arc::new(session);
                let firestore = config
                    .firestore
                    .clone()
                    .context("firestore backend selected without a firestore section")?;
                Self {
                    store: Arc::new(FirestoreStore::new(firestore, session.clone())),
                    identity: session.clone(),
                    session: Some(session),
                    toasts,
                }
            }
        };

        info!("Using {} backend", config.backend.as_str());
        Ok(services)
    }

    /// Toasts go to the on-screen queue and to the log
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(
            Fanout::new()
                .with(self.toasts.clone())
                .with(Arc::new(TracingNotifier)),
        )
    }

    /// A fresh panel bound to these services
    pub fn panel(&self, config: &Config) -> NewsPanel {
        NewsPanel::new(self.store.clone(), self.identity.clone(), self.notifier())
            .with_collection(config.collection.clone())
            .with_order(config.order)
    }

    /// Label of the signed-in user, if any
    pub fn user_label(&self) -> Option<String> {
        self.identity.current_user().map(|u| u.label().to_string())
    }
}

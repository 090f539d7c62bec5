//! The news admin panel
//!
//! `NewsPanel` owns the form fields and the cached list. Every write goes
//! straight to the document store and is followed by a full re-fetch; the
//! cached list is never patched locally, so it always reflects the last
//! successful fetch.

use crate::auth::IdentityProvider;
use crate::error::{AuthError, Error, Result};
use crate::notify::Notifier;
use crate::store::DocumentStore;
use crate::types::{ListOrder, NewsDraft, NewsItem, NEWS_COLLECTION};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A form input the panel validates before submitting.
///
/// A field holding only whitespace counts as blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Content,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

/// Result of submitting the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store accepted the record and assigned this id
    Created(String),
    /// A required field was blank; nothing was sent
    Rejected(FormField),
    /// The request failed; carries the message shown to the user
    Failed(String),
}

/// Result of a delete action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed(String),
}

pub struct NewsPanel {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    collection: String,
    order: ListOrder,
    items: Vec<NewsItem>,
    title: String,
    content: String,
}

impl NewsPanel {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            identity,
            notifier,
            collection: NEWS_COLLECTION.to_string(),
            order: ListOrder::default(),
            items: Vec::new(),
            title: String::new(),
            content: String::new(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&NewsItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn order(&self) -> ListOrder {
        self.order
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Initial load. A failure is reported and leaves the list as it was.
    pub async fn mount(&mut self) {
        info!("Mounting news panel on collection {}", self.collection);
        self.reload().await;
    }

    /// User-triggered reload; returns whether the fetch succeeded
    pub async fn refresh(&mut self) -> bool {
        self.reload().await
    }

    /// Replace the cached list with the store's current contents
    pub async fn fetch_all(&mut self) -> Result<()> {
        let docs = self.store.list_all(&self.collection).await?;
        let mut items: Vec<NewsItem> = docs.into_iter().map(NewsItem::from).collect();
        self.order.apply(&mut items);
        debug!("Fetched {} news items", items.len());
        self.items = items;
        Ok(())
    }

    /// Validate the form and send one create request
    pub async fn submit_create(&mut self) -> SubmitOutcome {
        if let Some(field) = self.blank_field() {
            debug!("Rejected submit: {} is blank", field.label());
            return SubmitOutcome::Rejected(field);
        }

        match self.create_from_form().await {
            Ok(id) => {
                info!("Created news item {}", id);
                self.notifier.success("News item added");
                self.title.clear();
                self.content.clear();
                self.reload().await;
                SubmitOutcome::Created(id)
            }
            Err(e) => {
                let message = format!("Failed to add news item: {}", e);
                warn!("{}", message);
                self.notifier.failure(&message);
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Send one delete request for `id`
    pub async fn delete_item(&mut self, id: &str) -> DeleteOutcome {
        match self.store.delete(&self.collection, id).await {
            Ok(()) => {
                info!("Deleted news item {}", id);
                self.notifier.success("News item deleted");
                self.reload().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                let message = format!("Failed to delete news item: {}", e);
                warn!("{}", message);
                self.notifier.failure(&message);
                DeleteOutcome::Failed(message)
            }
        }
    }

    /// First required field that is empty once trimmed
    fn blank_field(&self) -> Option<FormField> {
        if self.title.trim().is_empty() {
            Some(FormField::Title)
        } else if self.content.trim().is_empty() {
            Some(FormField::Content)
        } else {
            None
        }
    }

    async fn create_from_form(&self) -> Result<String> {
        self.identity.refresh().await?;
        let user = self
            .identity
            .current_user()
            .ok_or(Error::Auth(AuthError::NotSignedIn))?;
        let draft = NewsDraft::new(self.title.clone(), self.content.clone(), user.id);
        self.store
            .create(&self.collection, draft.into_fields())
            .await
    }

    async fn reload(&mut self) -> bool {
        match self.fetch_all().await {
            Ok(()) => true,
            Err(e) => {
                let message = format!("Failed to load news: {}", e);
                warn!("{}", message);
                self.notifier.failure(&message);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalIdentity, MockIdentityProvider};
    use crate::error::StoreError;
    use crate::notify::{ToastLevel, ToastQueue};
    use crate::store::{MemoryStore, MockDocumentStore};
    use crate::types::{Document, NewsDraft};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn doc(id: &str, title: &str) -> Document {
        Document::new(id, NewsDraft::new(title, "body", "u0").into_fields())
    }

    fn panel_with(store: Arc<dyn DocumentStore>, toasts: Arc<ToastQueue>) -> NewsPanel {
        NewsPanel::new(store, Arc::new(LocalIdentity::new("editor-1")), toasts)
    }

    fn store_error(message: &str) -> Error {
        StoreError::Request(message.to_string()).into()
    }

    #[tokio::test]
    async fn test_mount_replaces_list_verbatim() {
        let store = MemoryStore::with_documents("news", vec![doc("b", "Second"), doc("a", "First")]);
        let mut panel = panel_with(Arc::new(store), Arc::new(ToastQueue::default()));

        panel.mount().await;

        let ids: Vec<&str> = panel.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(panel.find("a").map(|i| i.title.as_str()), Some("First"));
    }

    #[tokio::test]
    async fn test_mount_failure_is_reported() {
        let mut store = MockDocumentStore::new();
        store
            .expect_list_all()
            .times(1)
            .returning(|_| Err(StoreError::Request("offline".to_string()).into()));
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(Arc::new(store), toasts.clone());

        panel.mount().await;

        assert!(panel.is_empty());
        let pending = toasts.drain();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, ToastLevel::Failure);
        assert!(pending[0].message.starts_with("Failed to load news"));
        assert!(pending[0].message.contains("offline"));
    }

    #[tokio::test]
    async fn test_blank_fields_send_nothing() {
        let mut store = MockDocumentStore::new();
        store.expect_create().never();
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(Arc::new(store), toasts.clone());

        assert_eq!(
            panel.submit_create().await,
            SubmitOutcome::Rejected(FormField::Title)
        );

        panel.set_title("Good news");
        panel.set_content("   ");
        assert_eq!(
            panel.submit_create().await,
            SubmitOutcome::Rejected(FormField::Content)
        );

        panel.set_title("\t \n");
        panel.set_content("body");
        assert_eq!(
            panel.submit_create().await,
            SubmitOutcome::Rejected(FormField::Title)
        );

        assert_eq!(panel.content(), "body");
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_create_stamps_author_and_clears_form() {
        let store = Arc::new(MemoryStore::new());
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(store.clone(), toasts.clone());
        panel.mount().await;

        panel.set_title("Good news");
        panel.set_content("Something nice happened");
        let outcome = panel.submit_create().await;

        let id = match outcome {
            SubmitOutcome::Created(id) => id,
            other => panic!("expected a created outcome, got {:?}", other),
        };
        assert_eq!(panel.len(), 1);
        let item = panel.find(&id).unwrap();
        assert_eq!(item.title, "Good news");
        assert_eq!(item.content, "Something nice happened");
        assert_eq!(item.author_id, "editor-1");
        assert!(item.created_at_time().is_some());

        assert_eq!(panel.title(), "");
        assert_eq!(panel.content(), "");
        assert_eq!(store.len("news"), 1);

        let pending = toasts.drain();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_form_and_list() {
        let mut store = MockDocumentStore::new();
        store
            .expect_list_all()
            .times(1)
            .returning(|_| Ok(vec![doc("a", "Existing")]));
        store
            .expect_create()
            .times(1)
            .returning(|_, _| Err(StoreError::Rejected {
                status: 403,
                message: "Missing or insufficient permissions.".to_string(),
            }
            .into()));
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(Arc::new(store), toasts.clone());
        panel.mount().await;
        let before = panel.items().to_vec();

        panel.set_title("Good news");
        panel.set_content("Something nice happened");
        let outcome = panel.submit_create().await;

        assert!(matches!(&outcome, SubmitOutcome::Failed(m) if m.contains("insufficient permissions")));
        assert_eq!(panel.title(), "Good news");
        assert_eq!(panel.content(), "Something nice happened");
        assert_eq!(panel.items(), before.as_slice());

        let pending = toasts.drain();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].message.starts_with("Failed to add news item"));
    }

    #[tokio::test]
    async fn test_create_without_user_fails() {
        let mut store = MockDocumentStore::new();
        store.expect_create().never();
        let mut identity = MockIdentityProvider::new();
        identity.expect_refresh().returning(|| Ok(()));
        identity.expect_current_user().returning(|| None);
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = NewsPanel::new(Arc::new(store), Arc::new(identity), toasts.clone());

        panel.set_title("t");
        panel.set_content("c");
        let outcome = panel.submit_create().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(m) if m.contains("No user is signed in")));
        assert_eq!(panel.title(), "t");
        assert_eq!(toasts.len(), 1);
    }

    #[tokio::test]
    async fn test_lapsed_sign_in_blocks_create() {
        let mut store = MockDocumentStore::new();
        store.expect_create().never();
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_refresh()
            .times(1)
            .returning(|| Err(AuthError::SessionExpired("TOKEN_EXPIRED".to_string()).into()));
        identity.expect_current_user().never();
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = NewsPanel::new(Arc::new(store), Arc::new(identity), toasts.clone());

        panel.set_title("t");
        panel.set_content("c");
        let outcome = panel.submit_create().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(m) if m.contains("Sign-in expired")));
        assert_eq!(panel.content(), "c");
    }

    #[tokio::test]
    async fn test_refetch_failure_after_create_keeps_success() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|_, _| Ok("new-id".to_string()));
        store
            .expect_list_all()
            .times(1)
            .returning(|_| Err(store_error("timeout")));
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(Arc::new(store), toasts.clone());

        panel.set_title("t");
        panel.set_content("c");
        assert_eq!(
            panel.submit_create().await,
            SubmitOutcome::Created("new-id".to_string())
        );

        let levels: Vec<ToastLevel> = toasts.drain().into_iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![ToastLevel::Success, ToastLevel::Failure]);
        assert_eq!(panel.title(), "");
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let store = Arc::new(MemoryStore::with_documents(
            "news",
            vec![doc("a", "First"), doc("b", "Second")],
        ));
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(store.clone(), toasts.clone());
        panel.mount().await;

        assert_eq!(panel.delete_item("a").await, DeleteOutcome::Deleted);

        assert!(panel.find("a").is_none());
        assert_eq!(panel.len(), 1);
        assert_eq!(toasts.drain()[0].message, "News item deleted");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let mut store = MockDocumentStore::new();
        store
            .expect_list_all()
            .times(1)
            .returning(|_| Ok(vec![doc("a", "First")]));
        store
            .expect_delete()
            .times(1)
            .returning(|_, _| Err(store_error("unavailable")));
        let toasts = Arc::new(ToastQueue::default());
        let mut panel = panel_with(Arc::new(store), toasts.clone());
        panel.mount().await;

        let outcome = panel.delete_item("a").await;

        assert!(matches!(outcome, DeleteOutcome::Failed(m) if m.contains("unavailable")));
        assert!(panel.find("a").is_some());
        assert_eq!(toasts.drain()[0].level, ToastLevel::Failure);
    }

    #[tokio::test]
    async fn test_configured_order_applies_to_fetch() {
        let older = Document::new(
            "old",
            NewsDraft::at("Old", "c", "u", Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
                .into_fields(),
        );
        let newer = doc("new", "New");
        let store = MemoryStore::with_documents("feed", vec![older, newer]);
        let mut panel = panel_with(Arc::new(store), Arc::new(ToastQueue::default()))
            .with_collection("feed")
            .with_order(ListOrder::NewestFirst);

        assert!(panel.refresh().await);

        assert_eq!(panel.collection(), "feed");
        assert_eq!(panel.order(), ListOrder::NewestFirst);
        assert_eq!(panel.items()[0].id, "new");
    }
}

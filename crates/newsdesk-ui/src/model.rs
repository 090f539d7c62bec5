//! Synchronous facade over the async news panel
//!
//! The terminal front end is line-driven, so each user action blocks on the
//! shared Tokio runtime until the panel operation completes.

use crate::render;
use crate::services::Services;
use newsdesk_core::{
    Config, DeleteOutcome, IdentityProvider, NewsPanel, SubmitOutcome, Toast, ToastQueue,
};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

pub struct NewsModel {
    runtime: Arc<Runtime>,
    panel: NewsPanel,
    toasts: Arc<ToastQueue>,
    identity: Arc<dyn IdentityProvider>,
}

impl NewsModel {
    pub fn new(runtime: Arc<Runtime>, services: &Services, config: &Config) -> Self {
        Self {
            runtime,
            panel: services.panel(config),
            toasts: services.toasts.clone(),
            identity: services.identity.clone(),
        }
    }

    pub fn panel(&self) -> &NewsPanel {
        &self.panel
    }

    pub fn mount(&mut self) {
        self.runtime.block_on(self.panel.mount());
    }

    pub fn refresh(&mut self) -> bool {
        self.runtime.block_on(self.panel.refresh())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.panel.set_title(title);
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.panel.set_content(content);
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.runtime.block_on(self.panel.submit_create())
    }

    /// Delete by 1-based list position or by id.
    ///
    /// Returns `None` when a position is out of range.
    pub fn delete(&mut self, target: &str) -> Option<DeleteOutcome> {
        let id = self.resolve_target(target)?;
        debug!("Deleting {} (from {:?})", id, target);
        Some(self.delete_id(&id))
    }

    /// Delete by document id without consulting the cached list
    pub fn delete_id(&mut self, id: &str) -> DeleteOutcome {
        self.runtime.block_on(self.panel.delete_item(id))
    }

    /// Map a position or id typed by the user to a document id.
    ///
    /// Unknown ids pass through so the store can report them.
    pub fn resolve_target(&self, target: &str) -> Option<String> {
        let target = target.trim();
        if self.panel.find(target).is_some() {
            return Some(target.to_string());
        }
        match target.parse::<usize>() {
            Ok(position) => position
                .checked_sub(1)
                .and_then(|idx| self.panel.items().get(idx))
                .map(|item| item.id.clone()),
            Err(_) => Some(target.to_string()),
        }
    }

    /// Pending toasts, oldest first; the queue is emptied
    pub fn take_toasts(&self) -> Vec<Toast> {
        self.toasts.drain()
    }

    pub fn user_label(&self) -> Option<String> {
        self.identity.current_user().map(|u| u.label().to_string())
    }

    pub fn render(&self) -> String {
        render::render_panel(&self.panel, self.user_label().as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_core::{BackendKind, FormField, ToastLevel};
    use pretty_assertions::assert_eq;

    fn model() -> NewsModel {
        let config = Config {
            backend: BackendKind::Memory,
            ..Config::default()
        };
        let services = Services::from_config(&config).unwrap();
        let runtime = Arc::new(Runtime::new().unwrap());
        let mut model = NewsModel::new(runtime, &services, &config);
        model.mount();
        model
    }

    fn add(model: &mut NewsModel, title: &str) -> String {
        model.set_title(title);
        model.set_content("body");
        match model.submit() {
            SubmitOutcome::Created(id) => id,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_submit_and_delete_by_position() {
        let mut model = model();
        add(&mut model, "First");
        let second = add(&mut model, "Second");

        assert_eq!(model.resolve_target("2"), Some(second.clone()));
        assert_eq!(model.delete("1"), Some(DeleteOutcome::Deleted));

        let ids: Vec<&str> = model.panel().items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str()]);
    }

    #[test]
    fn test_out_of_range_position() {
        let mut model = model();
        add(&mut model, "Only");
        model.take_toasts();

        assert_eq!(model.delete("0"), None);
        assert_eq!(model.delete("5"), None);
        assert!(model.take_toasts().is_empty());
    }

    #[test]
    fn test_unknown_id_reaches_store() {
        let mut model = model();
        let outcome = model.delete("no-such-id");
        assert!(matches!(outcome, Some(DeleteOutcome::Failed(_))));
        assert_eq!(model.take_toasts()[0].level, ToastLevel::Failure);
    }

    #[test]
    fn test_rejected_submit_and_render() {
        let mut model = model();
        model.set_content("body only");
        assert_eq!(model.submit(), SubmitOutcome::Rejected(FormField::Title));

        let screen = model.render();
        assert!(screen.starts_with(render::HEADER));
        assert!(screen.contains("Signed in as: admin"));
        assert!(screen.contains("Content: body only"));
        assert!(screen.contains("No news yet."));
    }
}

//! Notification sinks
//!
//! Toasts are fire-and-forget: a sink never reports back whether a message
//! was shown or dismissed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, warn};

/// Receives success and failure messages
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Failure,
}

/// A message waiting to be shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: chrono::Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == ToastLevel::Failure
    }
}

/// Bounded queue of toasts drained by the front end
#[derive(Debug)]
pub struct ToastQueue {
    toasts: Mutex<VecDeque<Toast>>,
    capacity: usize,
}

impl ToastQueue {
    pub const DEFAULT_CAPACITY: usize = 5;

    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn push(&self, toast: Toast) {
        let mut toasts = self.toasts.lock();
        while toasts.len() >= self.capacity {
            toasts.pop_front();
        }
        toasts.push_back(toast);
    }

    /// Take every pending toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        self.toasts.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Notifier for ToastQueue {
    fn success(&self, message: &str) {
        self.push(Toast::new(ToastLevel::Success, message));
    }

    fn failure(&self, message: &str) {
        self.push(Toast::new(ToastLevel::Failure, message));
    }
}

/// Writes toasts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "newsdesk::toast", "{}", message);
    }

    fn failure(&self, message: &str) {
        warn!(target: "newsdesk::toast", "{}", message);
    }
}

/// Forwards every message to several sinks
#[derive(Default, Clone)]
pub struct Fanout {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Notifier for Fanout {
    fn success(&self, message: &str) {
        for sink in &self.sinks {
            sink.success(message);
        }
    }

    fn failure(&self, message: &str) {
        for sink in &self.sinks {
            sink.failure(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_keeps_order() {
        let queue = ToastQueue::default();
        queue.success("saved");
        queue.failure("broken");

        let toasts = queue.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].level, ToastLevel::Success);
        assert_eq!(toasts[0].message, "saved");
        assert!(toasts[1].is_failure());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_drops_oldest_past_capacity() {
        let queue = ToastQueue::new(2);
        queue.success("one");
        queue.success("two");
        queue.success("three");

        assert_eq!(queue.len(), 2);
        let messages: Vec<String> = queue.drain().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let queue = Arc::new(ToastQueue::default());
        let mut mock = MockNotifier::new();
        mock.expect_failure().times(1).return_const(());
        mock.expect_success().never();

        let fanout = Fanout::new()
            .with(queue.clone())
            .with(Arc::new(TracingNotifier))
            .with(Arc::new(mock));
        fanout.failure("down");

        assert_eq!(queue.drain()[0].message, "down");
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let queue = ToastQueue::new(usize::MAX);
        queue.success("fine");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_zero_capacity_still_holds_latest() {
        let queue = ToastQueue::new(0);
        queue.failure("a");
        queue.failure("b");
        assert_eq!(queue.drain()[0].message, "b");
    }
}

//! Notification sinks
//!
//! The lifecycle engine only ever hands a [`Notice`] to a sink and moves on;
//! delivery is the sink's business.

use parking_lot::Mutex;
use shared::models::Notice;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One-way, fire-and-forget notification target
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub type SharedSink = Arc<dyn NotificationSink>;

/// Channel-backed sink feeding the [`NotificationWorker`](super::NotificationWorker)
#[derive(Debug)]
pub struct NotificationService {
    tx: mpsc::Sender<Notice>,
}

impl NotificationService {
    /// Create the service and the receiver the worker drains
    pub fn new(buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Arc::new(Self { tx }), rx)
    }
}

impl NotificationSink for NotificationService {
    /// Never blocks: a full or closed channel drops the notice
    fn notify(&self, notice: Notice) {
        match self.tx.try_send(notice) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notice)) => {
                tracing::warn!(
                    target_username = %notice.target_username,
                    reference_id = notice.reference_id,
                    "Notification queue full, notice dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(notice)) => {
                tracing::warn!(
                    target_username = %notice.target_username,
                    reference_id = notice.reference_id,
                    "Notification worker stopped, notice dropped"
                );
            }
        }
    }
}

/// Keeps every notice in memory; used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<Notice>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

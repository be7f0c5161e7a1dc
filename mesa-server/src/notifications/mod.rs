//! Notification Dispatcher
//!
//! ```text
//! OrderService ──► NotificationDispatcher ──► NotificationSink
//!                   (picks recipients)         │
//!                                              ▼ mpsc (try_send)
//!                                       NotificationWorker ──► notification table
//! ```

mod dispatcher;
mod sink;
mod worker;

pub use dispatcher::NotificationDispatcher;
pub use sink::{MemorySink, NotificationService, NotificationSink, SharedSink};
pub use worker::NotificationWorker;

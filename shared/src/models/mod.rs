//! Data models
//!
//! Shared between mesa-server and its callers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod notification;
pub mod order;
pub mod report;
pub mod session;
pub mod staff;
pub mod table_assignment;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use menu_item::*;
pub use notification::*;
pub use order::*;
pub use report::*;
pub use session::*;
pub use staff::*;
pub use table_assignment::*;

//! Table/Assignment Tracker
//!
//! Dining tables, their QR tokens and which waiter looks after each table.

mod service;

pub use service::TableService;

//! Aggregation Engine
//!
//! Sales, popular items and preparation-time reports, recomputed from order
//! history on every call. Nothing here is persisted.

pub mod aggregate;
mod service;

pub use aggregate::DEFAULT_POPULAR_LIMIT;
pub use service::ReportsService;

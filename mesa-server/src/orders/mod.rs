//! Order Lifecycle Engine

pub mod lifecycle;
mod service;

pub use lifecycle::{check_transition, clamp_updated_at, estimated_time};
pub use service::{OrderOrigin, OrderService};

//! Shared types for the Mesa dine-in ordering system
//!
//! Domain models, the unified error system and time helpers used by the
//! server crate and by anything that talks to it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorKind};
pub use serde::{Deserialize, Serialize};

//! Caller-facing failure taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification every [`ErrorCode`](super::ErrorCode) maps onto.
///
/// Callers (controllers, CLIs) decide their user-facing response from the
/// kind alone; the code carries the precise reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A referenced table, order, menu item, category or assignment is absent
    NotFound,
    /// Bad QR code, expired or mismatched session, malformed status target
    InvalidArgument,
    /// The operation contradicts existing state (active orders, duplicates)
    Conflict,
    /// Store unavailability or a bug; propagated, never retried
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

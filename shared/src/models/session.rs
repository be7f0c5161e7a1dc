//! Table Session Model

use serde::{Deserialize, Serialize};

/// Ephemeral proof that a customer is seated at a table.
///
/// Lives only in process memory; valid while `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSession {
    pub session_id: String,
    pub table_id: i64,
    pub table_number: i32,
    pub created_at: i64,
    pub expires_at: i64,
}

impl TableSession {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

//! Table Assignment Model

use serde::{Deserialize, Serialize};

/// Links a table to the waiter responsible for it on a shift date.
///
/// At most one assignment per table is active at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableAssignment {
    pub id: i64,
    pub table_id: i64,
    pub table_number: i32,
    pub waiter_username: String,
    /// Shift date (YYYY-MM-DD)
    pub shift_date: String,
    pub is_active: bool,
    pub created_at: i64,
}

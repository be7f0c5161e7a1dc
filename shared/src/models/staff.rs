//! Staff Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StaffRole {
    Admin,
    Manager,
    Kitchen,
    Waiter,
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StaffRole::Admin => "ADMIN",
            StaffRole::Manager => "MANAGER",
            StaffRole::Kitchen => "KITCHEN",
            StaffRole::Waiter => "WAITER",
        };
        f.write_str(name)
    }
}

/// Staff member (notification target, assignment owner)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: i64,
}

/// Register staff payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreate {
    pub username: String,
    pub display_name: Option<String>,
    pub role: StaffRole,
}

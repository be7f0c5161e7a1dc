//! Notification Model

use serde::{Deserialize, Serialize};

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NotificationType {
    OrderReady,
    NewOrder,
    TableRequest,
    OrderIssue,
    System,
}

/// What a notification's `reference_id` points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReferenceType {
    Order,
    Table,
}

/// Outgoing notice handed to a notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub target_username: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub reference_id: i64,
    pub reference_type: ReferenceType,
}

/// Persisted notification row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub target_username: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub reference_id: Option<i64>,
    pub reference_type: Option<ReferenceType>,
    pub is_read: bool,
    pub created_at: i64,
}

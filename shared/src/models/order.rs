//! Order Model
//!
//! Orders and their lines, plus the two status state machines.
//!
//! ```text
//! PENDING → CONFIRMED → IN_PROGRESS → READY → DELIVERED
//!    └──────────┴────────────┴─────────┴──→ CANCELLED
//! ```

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses that still need work (kitchen or delivery)
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Legal forward edges from this status
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::InProgress, OrderStatus::Cancelled],
            OrderStatus::InProgress => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// DELIVERED and CANCELLED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidOrderStatus,
                    format!("Unknown order status: {}", s),
                )
                .with_detail("status", s)
            })
    }
}

/// Order item status (reduced subset of the order lifecycle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderItemStatus {
    Pending,
    InPreparation,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderItemStatus {
    pub const ALL: [OrderItemStatus; 5] = [
        OrderItemStatus::Pending,
        OrderItemStatus::InPreparation,
        OrderItemStatus::Ready,
        OrderItemStatus::Delivered,
        OrderItemStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "PENDING",
            OrderItemStatus::InPreparation => "IN_PREPARATION",
            OrderItemStatus::Ready => "READY",
            OrderItemStatus::Delivered => "DELIVERED",
            OrderItemStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn allowed_transitions(&self) -> &'static [OrderItemStatus] {
        match self {
            OrderItemStatus::Pending => {
                &[OrderItemStatus::InPreparation, OrderItemStatus::Cancelled]
            }
            OrderItemStatus::InPreparation => {
                &[OrderItemStatus::Ready, OrderItemStatus::Cancelled]
            }
            OrderItemStatus::Ready => &[OrderItemStatus::Delivered, OrderItemStatus::Cancelled],
            OrderItemStatus::Delivered | OrderItemStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderItemStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderItemStatus::Delivered | OrderItemStatus::Cancelled)
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidOrderStatus,
                    format!("Unknown order item status: {}", s),
                )
                .with_detail("status", s)
            })
    }
}

/// Order row
///
/// `table_number` is joined from `dining_table`. `updated_at` stays `None`
/// until the first status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub table_number: i32,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub special_instructions: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Order line with the menu item's live display data joined in.
///
/// `price` is the snapshot taken when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
    pub price: f64,
    pub status: OrderItemStatus,
    pub menu_item_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub image_name: Option<String>,
    pub image_content_type: Option<String>,
    pub image_size: Option<i64>,
}

/// Order with its full item list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

impl OrderDetail {
    pub fn id(&self) -> i64 {
        self.order.id
    }

    pub fn status(&self) -> OrderStatus {
        self.order.status
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }
}

/// One requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    pub customer_name: Option<String>,
    pub special_instructions: Option<String>,
    pub items: Vec<OrderItemInput>,
}

/// Customer-facing progress view of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusView {
    pub order_id: i64,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub estimated_time: String,
}

//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity
///
/// `category_name` is joined from `category` when loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current list price; copied into order items at order time
    pub price: f64,
    pub category_id: i64,
    pub category_name: String,
    pub image_name: Option<String>,
    pub image_content_type: Option<String>,
    pub image_size: Option<i64>,
    pub is_available: bool,
    pub display_order: i32,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i64,
    pub image_name: Option<String>,
    pub image_content_type: Option<String>,
    pub image_size: Option<i64>,
    pub is_available: Option<bool>,
    pub display_order: Option<i32>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub image_name: Option<String>,
    pub image_content_type: Option<String>,
    pub image_size: Option<i64>,
    pub is_available: Option<bool>,
    pub display_order: Option<i32>,
}

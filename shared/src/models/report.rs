//! Report Models (derived, never persisted)
//!
//! Money is `Decimal` at 2 dp; durations are whole seconds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revenue and order count for one hour of the business day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySales {
    /// Hour of day (0-23) in the business timezone
    pub hour: u32,
    pub order_count: i64,
    pub revenue: Decimal,
}

/// Sales report over an inclusive date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    /// Window start (YYYY-MM-DD)
    pub start_date: String,
    /// Window end, inclusive (YYYY-MM-DD)
    pub end_date: String,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub total_items_sold: i64,
    pub revenue_by_category: BTreeMap<String, Decimal>,
    pub revenue_by_item: BTreeMap<String, Decimal>,
    pub quantity_by_item: BTreeMap<String, i64>,
    /// Only hours with at least one order, ascending
    pub hourly_sales: Vec<HourlySales>,
}

/// One ranked entry of the popular-items report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularItemEntry {
    pub menu_item_id: i64,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    pub revenue: Decimal,
    /// quantity / total orders × 100, 2 dp half-up
    pub percentage_of_orders: Decimal,
}

/// Popular items ranked by quantity sold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularItems {
    pub start_date: String,
    pub end_date: String,
    pub total_orders: i64,
    pub items: Vec<PopularItemEntry>,
}

/// Average preparation time for one hour-of-day bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationTimeByHour {
    pub hour: u32,
    pub order_count: i64,
    pub average_secs: i64,
}

/// Average preparation time report (READY/DELIVERED orders only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationTimeReport {
    pub start_date: String,
    pub end_date: String,
    pub order_count: i64,
    pub overall_average_secs: i64,
    pub by_category: BTreeMap<String, i64>,
    pub by_menu_item: BTreeMap<String, i64>,
    pub by_hour: Vec<PreparationTimeByHour>,
}

/// Kitchen dashboard for one business day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenStatistics {
    pub business_date: String,
    pub total_orders: i64,
    /// PENDING + CONFIRMED
    pub pending_orders: i64,
    pub in_progress_orders: i64,
    /// READY + DELIVERED
    pub completed_orders: i64,
    pub average_preparation_secs: i64,
    pub quantity_by_item: BTreeMap<String, i64>,
}

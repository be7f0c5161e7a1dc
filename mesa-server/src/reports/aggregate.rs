//! Report aggregation
//!
//! Pure functions over loaded order history. Callers pass every order that
//! might fall in the window; filtering by window and status happens here, so
//! the same input always yields the same report.

use crate::utils::time::{ReportWindow, hour_of_day};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    HourlySales, KitchenStatistics, OrderDetail, OrderStatus, PopularItemEntry, PopularItems,
    PreparationTimeByHour, PreparationTimeReport, SalesReport,
};
use shared::util::{round_money, to_decimal};
use std::collections::{BTreeMap, HashMap};

/// Default size of the popular-items ranking
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Running sum of whole seconds, averaged by floor division
#[derive(Debug, Default, Clone, Copy)]
struct SecondsAcc {
    sum: i64,
    count: i64,
}

impl SecondsAcc {
    fn add(&mut self, secs: i64) {
        self.sum += secs;
        self.count += 1;
    }

    fn average(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            self.sum.div_euclid(self.count)
        }
    }
}

fn line_revenue(price: f64, quantity: i32) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Orders that count as sales: inside the window and not cancelled
fn sold<'a>(
    orders: &'a [OrderDetail],
    window: &'a ReportWindow,
) -> impl Iterator<Item = &'a OrderDetail> + 'a {
    orders
        .iter()
        .filter(|o| o.status() != OrderStatus::Cancelled && window.contains(o.order.created_at))
}

/// Elapsed whole seconds for orders that reached READY or DELIVERED
fn preparation_secs(order: &OrderDetail) -> Option<i64> {
    if !matches!(order.status(), OrderStatus::Ready | OrderStatus::Delivered) {
        return None;
    }
    let updated_at = order.order.updated_at?;
    Some((updated_at - order.order.created_at).max(0).div_euclid(1_000))
}

pub fn sales_report(orders: &[OrderDetail], window: &ReportWindow, tz: Tz) -> SalesReport {
    let mut total_orders = 0i64;
    let mut total_revenue = Decimal::ZERO;
    let mut total_items_sold = 0i64;
    let mut revenue_by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut revenue_by_item: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut quantity_by_item: BTreeMap<String, i64> = BTreeMap::new();
    let mut hourly: BTreeMap<u32, (i64, Decimal)> = BTreeMap::new();

    for order in sold(orders, window) {
        total_orders += 1;
        let mut order_revenue = Decimal::ZERO;

        for item in &order.items {
            let revenue = line_revenue(item.price, item.quantity);
            order_revenue += revenue;
            total_items_sold += i64::from(item.quantity);

            *revenue_by_category
                .entry(item.category_name.clone())
                .or_default() += revenue;
            *revenue_by_item
                .entry(item.menu_item_name.clone())
                .or_default() += revenue;
            *quantity_by_item
                .entry(item.menu_item_name.clone())
                .or_default() += i64::from(item.quantity);
        }

        total_revenue += order_revenue;
        let bucket = hourly
            .entry(hour_of_day(order.order.created_at, tz))
            .or_insert((0, Decimal::ZERO));
        bucket.0 += 1;
        bucket.1 += order_revenue;
    }

    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        round_money(total_revenue / Decimal::from(total_orders))
    };

    SalesReport {
        start_date: window.start_label(),
        end_date: window.end_label(),
        total_orders,
        total_revenue: round_money(total_revenue),
        average_order_value,
        total_items_sold,
        revenue_by_category: revenue_by_category
            .into_iter()
            .map(|(k, v)| (k, round_money(v)))
            .collect(),
        revenue_by_item: revenue_by_item
            .into_iter()
            .map(|(k, v)| (k, round_money(v)))
            .collect(),
        quantity_by_item,
        hourly_sales: hourly
            .into_iter()
            .map(|(hour, (order_count, revenue))| HourlySales {
                hour,
                order_count,
                revenue: round_money(revenue),
            })
            .collect(),
    }
}

/// Menu items ranked by quantity sold, ties by ascending menu item id
pub fn popular_items(orders: &[OrderDetail], window: &ReportWindow, limit: usize) -> PopularItems {
    let mut total_orders = 0i64;
    let mut by_item: HashMap<i64, PopularItemEntry> = HashMap::new();

    for order in sold(orders, window) {
        total_orders += 1;
        for item in &order.items {
            let entry = by_item
                .entry(item.menu_item_id)
                .or_insert_with(|| PopularItemEntry {
                    menu_item_id: item.menu_item_id,
                    name: item.menu_item_name.clone(),
                    category_name: item.category_name.clone(),
                    quantity: 0,
                    revenue: Decimal::ZERO,
                    percentage_of_orders: Decimal::ZERO,
                });
            entry.quantity += i64::from(item.quantity);
            entry.revenue += line_revenue(item.price, item.quantity);
        }
    }

    let mut items: Vec<PopularItemEntry> = by_item.into_values().collect();
    items.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(a.menu_item_id.cmp(&b.menu_item_id))
    });
    items.truncate(limit);

    for entry in &mut items {
        entry.revenue = round_money(entry.revenue);
        if total_orders > 0 {
            entry.percentage_of_orders = round_money(
                Decimal::from(entry.quantity) * Decimal::ONE_HUNDRED / Decimal::from(total_orders),
            );
        }
    }

    PopularItems {
        start_date: window.start_label(),
        end_date: window.end_label(),
        total_orders,
        items,
    }
}

/// Average time from placement to READY/DELIVERED
///
/// Category and menu item averages count every line of an order, so an
/// order with two lines in one category weighs twice there.
pub fn preparation_time(
    orders: &[OrderDetail],
    window: &ReportWindow,
    tz: Tz,
) -> PreparationTimeReport {
    let mut overall = SecondsAcc::default();
    let mut by_category: BTreeMap<String, SecondsAcc> = BTreeMap::new();
    let mut by_menu_item: BTreeMap<String, SecondsAcc> = BTreeMap::new();
    let mut by_hour: BTreeMap<u32, SecondsAcc> = BTreeMap::new();

    for order in orders.iter().filter(|o| window.contains(o.order.created_at)) {
        let Some(secs) = preparation_secs(order) else {
            continue;
        };
        overall.add(secs);
        by_hour
            .entry(hour_of_day(order.order.created_at, tz))
            .or_default()
            .add(secs);
        for item in &order.items {
            by_category
                .entry(item.category_name.clone())
                .or_default()
                .add(secs);
            by_menu_item
                .entry(item.menu_item_name.clone())
                .or_default()
                .add(secs);
        }
    }

    PreparationTimeReport {
        start_date: window.start_label(),
        end_date: window.end_label(),
        order_count: overall.count,
        overall_average_secs: overall.average(),
        by_category: by_category
            .into_iter()
            .map(|(k, acc)| (k, acc.average()))
            .collect(),
        by_menu_item: by_menu_item
            .into_iter()
            .map(|(k, acc)| (k, acc.average()))
            .collect(),
        by_hour: by_hour
            .into_iter()
            .map(|(hour, acc)| PreparationTimeByHour {
                hour,
                order_count: acc.count,
                average_secs: acc.average(),
            })
            .collect(),
    }
}

/// Kitchen dashboard for the business day covered by `window`
pub fn kitchen_statistics(orders: &[OrderDetail], window: &ReportWindow) -> KitchenStatistics {
    let mut stats = KitchenStatistics {
        business_date: window.start_label(),
        total_orders: 0,
        pending_orders: 0,
        in_progress_orders: 0,
        completed_orders: 0,
        average_preparation_secs: 0,
        quantity_by_item: BTreeMap::new(),
    };
    let mut prep = SecondsAcc::default();

    for order in orders.iter().filter(|o| window.contains(o.order.created_at)) {
        stats.total_orders += 1;
        match order.status() {
            OrderStatus::Pending | OrderStatus::Confirmed => stats.pending_orders += 1,
            OrderStatus::InProgress => stats.in_progress_orders += 1,
            OrderStatus::Ready | OrderStatus::Delivered => stats.completed_orders += 1,
            OrderStatus::Cancelled => continue,
        }
        if let Some(secs) = preparation_secs(order) {
            prep.add(secs);
        }
        for item in &order.items {
            *stats
                .quantity_by_item
                .entry(item.menu_item_name.clone())
                .or_default() += i64::from(item.quantity);
        }
    }

    stats.average_preparation_secs = prep.average();
    stats
}

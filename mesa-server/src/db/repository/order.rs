//! Order Repository
//!
//! Orders and order items. An order owns its items: they are written in the
//! same transaction as the order and removed with it.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderDetail, OrderItemDetail, OrderItemStatus, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

const ORDER_SELECT: &str = "SELECT o.id, o.table_id, t.table_number, o.customer_name, o.status, o.special_instructions, o.created_at, o.updated_at FROM orders o JOIN dining_table t ON t.id = o.table_id";

const ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.menu_item_id, oi.quantity, oi.special_instructions, oi.price, oi.status, m.name AS menu_item_name, m.category_id, c.name AS category_name, m.image_name, m.image_content_type, m.image_size FROM order_item oi JOIN menu_item m ON m.id = oi.menu_item_id JOIN category c ON c.id = m.category_id";

/// Max bind parameters per IN (...) batch
const ID_BATCH: usize = 500;

/// New order header
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: i64,
    pub customer_name: Option<String>,
    pub special_instructions: Option<String>,
}

/// New order line with the price already resolved from the menu
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
    pub price: f64,
}

/// Insert an order and all of its lines atomically. Returns the order id.
pub async fn create(
    pool: &SqlitePool,
    order: NewOrder,
    lines: &[NewOrderLine],
    now: i64,
) -> RepoResult<i64> {
    if lines.is_empty() {
        return Err(RepoError::Validation("Order must contain at least one item".into()));
    }

    let mut tx = pool.begin().await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (table_id, customer_name, status, special_instructions, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, NULL) RETURNING id",
    )
    .bind(order.table_id)
    .bind(&order.customer_name)
    .bind(OrderStatus::Pending)
    .bind(&order.special_instructions)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            "INSERT INTO order_item (order_id, menu_item_id, quantity, special_instructions, price, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(&line.special_instructions)
        .bind(line.price)
        .bind(OrderItemStatus::Pending)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE o.id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let mut details = attach_items(pool, vec![order]).await?;
    Ok(details.pop())
}

pub async fn find_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!("{ORDER_SELECT} WHERE o.table_id = ? ORDER BY o.created_at, o.id");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_all(pool)
        .await?;
    attach_items(pool, orders).await
}

/// Orders in any of `statuses`, oldest first
pub async fn find_by_statuses(
    pool: &SqlitePool,
    statuses: &[OrderStatus],
) -> RepoResult<Vec<OrderDetail>> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ORDER_SELECT);
    qb.push(" WHERE o.status IN (");
    let mut separated = qb.separated(", ");
    for status in statuses {
        separated.push_bind(*status);
    }
    separated.push_unseparated(") ORDER BY o.created_at, o.id");

    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;
    attach_items(pool, orders).await
}

/// Orders created inside `[start_millis, end_millis]` (both inclusive)
pub async fn find_created_between(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE o.created_at >= ? AND o.created_at <= ? ORDER BY o.created_at, o.id"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(start_millis)
        .bind(end_millis)
        .fetch_all(pool)
        .await?;
    attach_items(pool, orders).await
}

/// True iff the table has an order that is neither DELIVERED nor CANCELLED
pub async fn has_active_orders(pool: &SqlitePool, table_id: i64) -> RepoResult<bool> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM orders WHERE table_id = ");
    qb.push_bind(table_id);
    qb.push(" AND status IN (");
    let mut separated = qb.separated(", ");
    for status in OrderStatus::ACTIVE {
        separated.push_bind(status);
    }
    separated.push_unseparated("))");

    let exists: bool = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(exists)
}

pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: OrderStatus,
    updated_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn find_item(
    pool: &SqlitePool,
    order_id: i64,
    item_id: i64,
) -> RepoResult<Option<OrderItemDetail>> {
    let sql = format!("{ITEM_SELECT} WHERE oi.order_id = ? AND oi.id = ?");
    let item = sqlx::query_as::<_, OrderItemDetail>(&sql)
        .bind(order_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn update_item_status(
    pool: &SqlitePool,
    order_id: i64,
    item_id: i64,
    status: OrderItemStatus,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE order_item SET status = ?1 WHERE id = ?2 AND order_id = ?3")
        .bind(status)
        .bind(item_id)
        .bind(order_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Order item {item_id} not found in order {order_id}"
        )));
    }
    Ok(())
}

/// Load the lines of `orders` and pair them up, preserving order sequence
async fn attach_items(pool: &SqlitePool, orders: Vec<Order>) -> RepoResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<i64, Vec<OrderItemDetail>> = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(ID_BATCH) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ITEM_SELECT);
        qb.push(" WHERE oi.order_id IN (");
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY oi.order_id, oi.id");

        let items = qb.build_query_as::<OrderItemDetail>().fetch_all(pool).await?;
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderDetail { order, items }
        })
        .collect())
}

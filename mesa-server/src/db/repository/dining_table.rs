//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, table_number, capacity, qr_code, status, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("SELECT {COLUMNS} FROM dining_table WHERE id = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("SELECT {COLUMNS} FROM dining_table ORDER BY table_number");
    let tables = sqlx::query_as::<_, DiningTable>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(tables)
}

pub async fn create(
    pool: &SqlitePool,
    data: DiningTableCreate,
    qr_code: &str,
    now: i64,
) -> RepoResult<DiningTable> {
    if let Some(capacity) = data.capacity
        && capacity < 1
    {
        return Err(RepoError::Validation(format!(
            "Capacity must be at least 1, got {capacity}"
        )));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO dining_table (table_number, capacity, qr_code, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id",
    )
    .bind(data.table_number)
    .bind(data.capacity.unwrap_or(4))
    .bind(qr_code)
    .bind(data.status.unwrap_or_default())
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Table number {} already exists", data.table_number))
        }
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: DiningTableUpdate,
    now: i64,
) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE dining_table SET table_number = COALESCE(?1, table_number), capacity = COALESCE(?2, capacity), status = COALESCE(?3, status), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.table_number)
    .bind(data.capacity)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dining table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dining table {id} not found")))
}

pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: TableStatus,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE dining_table SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dining table {id} not found")));
    }
    Ok(())
}

pub async fn update_qr_code(
    pool: &SqlitePool,
    id: i64,
    qr_code: &str,
    now: i64,
) -> RepoResult<DiningTable> {
    let rows = sqlx::query("UPDATE dining_table SET qr_code = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(qr_code)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dining table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dining table {id} not found")))
}

/// Outcome of [`delete_cascade`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableDeletion {
    Deleted,
    Missing,
    HasActiveOrders,
}

/// Delete a table together with everything it owns
///
/// Assignments and the table's DELIVERED/CANCELLED orders with their items go
/// in the same transaction as the table row. The active-order check runs
/// after the first write, so a concurrent order insert either lands before
/// it (and blocks the delete) or waits for the commit.
pub async fn delete_cascade(pool: &SqlitePool, id: i64) -> RepoResult<TableDeletion> {
    let mut tx = pool.begin().await?;

    // No-op write to take the write lock
    let touched = sqlx::query("UPDATE dining_table SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Ok(TableDeletion::Missing);
    }

    let active: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM orders WHERE table_id = ? AND status NOT IN ('DELIVERED', 'CANCELLED'))",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    if active {
        // Dropping the transaction rolls it back
        return Ok(TableDeletion::HasActiveOrders);
    }

    sqlx::query("DELETE FROM table_assignment WHERE table_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "DELETE FROM order_item WHERE order_id IN (SELECT id FROM orders WHERE table_id = ? AND status IN ('DELIVERED', 'CANCELLED'))",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    let orders = sqlx::query(
        "DELETE FROM orders WHERE table_id = ? AND status IN ('DELIVERED', 'CANCELLED')",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        table_id = id,
        orders_removed = orders.rows_affected(),
        "Dining table deleted"
    );
    Ok(TableDeletion::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order::{self, NewOrder, NewOrderLine};
    use crate::db::repository::test_support;
    use shared::models::OrderStatus;

    async fn seed_order(pool: &SqlitePool, table_id: i64) -> i64 {
        let category = test_support::category(pool, "Mains").await;
        let burger = test_support::menu_item(pool, category.id, "Burger", 5.0).await;
        order::create(
            pool,
            NewOrder {
                table_id,
                customer_name: None,
                special_instructions: None,
            },
            &[NewOrderLine {
                menu_item_id: burger.id,
                quantity: 1,
                special_instructions: None,
                price: 5.0,
            }],
            2_000,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_support::pool().await;
        let table = test_support::table(&pool, 5).await;
        assert_eq!(table.table_number, 5);
        assert_eq!(table.status, TableStatus::Available);
        assert_eq!(table.qr_code, "qr-5");

        let found = find_by_id(&pool, table.id).await.unwrap().unwrap();
        assert_eq!(found.id, table.id);
        assert!(find_by_id(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let pool = test_support::pool().await;
        test_support::table(&pool, 1).await;
        let err = create(
            &pool,
            DiningTableCreate {
                table_number: 1,
                capacity: None,
                status: None,
            },
            "other-qr",
            0,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_missing_table() {
        let pool = test_support::pool().await;
        let err = update(&pool, 42, DiningTableUpdate::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let pool = test_support::pool().await;
        let table = test_support::table(&pool, 2).await;
        let updated = update(
            &pool,
            table.id,
            DiningTableUpdate {
                capacity: Some(8),
                status: Some(TableStatus::Occupied),
                ..Default::default()
            },
            2_000,
        )
        .await
        .unwrap();
        assert_eq!(updated.table_number, 2);
        assert_eq!(updated.capacity, 8);
        assert_eq!(updated.status, TableStatus::Occupied);
        assert_eq!(updated.updated_at, 2_000);
    }

    #[tokio::test]
    async fn test_delete_cascade_keeps_active_orders() {
        let pool = test_support::pool().await;
        let table = test_support::table(&pool, 7).await;
        let order_id = seed_order(&pool, table.id).await;

        let outcome = delete_cascade(&pool, table.id).await.unwrap();
        assert_eq!(outcome, TableDeletion::HasActiveOrders);
        assert!(find_by_id(&pool, table.id).await.unwrap().is_some());
        assert!(order::find_by_id(&pool, order_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cascade_removes_terminal_history() {
        let pool = test_support::pool().await;
        let table = test_support::table(&pool, 8).await;
        let order_id = seed_order(&pool, table.id).await;
        order::update_status(&pool, order_id, OrderStatus::Delivered, 3_000)
            .await
            .unwrap();

        let outcome = delete_cascade(&pool, table.id).await.unwrap();
        assert_eq!(outcome, TableDeletion::Deleted);
        assert!(find_by_id(&pool, table.id).await.unwrap().is_none());
        assert!(order::find_by_id(&pool, order_id).await.unwrap().is_none());

        assert_eq!(
            delete_cascade(&pool, table.id).await.unwrap(),
            TableDeletion::Missing
        );
    }
}

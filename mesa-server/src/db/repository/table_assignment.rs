//! Table Assignment Repository

use super::{RepoError, RepoResult};
use shared::models::TableAssignment;
use sqlx::SqlitePool;

const SELECT: &str = "SELECT a.id, a.table_id, t.table_number, a.waiter_username, a.shift_date, a.is_active, a.created_at FROM table_assignment a JOIN dining_table t ON t.id = a.table_id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<TableAssignment>> {
    let sql = format!("{SELECT} WHERE a.id = ?");
    let assignment = sqlx::query_as::<_, TableAssignment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(assignment)
}

pub async fn find_active_by_table(
    pool: &SqlitePool,
    table_id: i64,
) -> RepoResult<Option<TableAssignment>> {
    let sql = format!("{SELECT} WHERE a.table_id = ? AND a.is_active = 1");
    let assignment = sqlx::query_as::<_, TableAssignment>(&sql)
        .bind(table_id)
        .fetch_optional(pool)
        .await?;
    Ok(assignment)
}

pub async fn find_active_by_waiter(
    pool: &SqlitePool,
    waiter_username: &str,
) -> RepoResult<Vec<TableAssignment>> {
    let sql = format!("{SELECT} WHERE a.waiter_username = ? AND a.is_active = 1 ORDER BY t.table_number");
    let assignments = sqlx::query_as::<_, TableAssignment>(&sql)
        .bind(waiter_username)
        .fetch_all(pool)
        .await?;
    Ok(assignments)
}

/// Replace the table's active assignment in one transaction
///
/// Deactivation runs first so the write lock is taken before anything is
/// read; the partial unique index rejects any second active row.
pub async fn assign(
    pool: &SqlitePool,
    table_id: i64,
    waiter_username: &str,
    shift_date: &str,
    now: i64,
) -> RepoResult<TableAssignment> {
    let mut tx = pool.begin().await?;

    let replaced = sqlx::query(
        "UPDATE table_assignment SET is_active = 0 WHERE table_id = ? AND is_active = 1",
    )
    .bind(table_id)
    .execute(&mut *tx)
    .await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO table_assignment (table_id, waiter_username, shift_date, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4) RETURNING id",
    )
    .bind(table_id)
    .bind(waiter_username)
    .bind(shift_date)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        table_id,
        replaced = replaced.rows_affected(),
        "Active table assignment replaced"
    );
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table assignment".into()))
}

/// Deactivate every active assignment of the table, returns how many changed
pub async fn deactivate_all(pool: &SqlitePool, table_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE table_assignment SET is_active = 0 WHERE table_id = ? AND is_active = 1",
    )
    .bind(table_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn count_active(pool: &SqlitePool, table_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM table_assignment WHERE table_id = ? AND is_active = 1",
    )
    .bind(table_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

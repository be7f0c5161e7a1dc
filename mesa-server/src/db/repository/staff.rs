//! Staff Repository

use super::{RepoError, RepoResult};
use shared::models::{Staff, StaffCreate, StaffRole};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, display_name, role, is_active, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Staff>> {
    let sql = format!("SELECT {COLUMNS} FROM staff WHERE id = ?");
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Staff>> {
    let sql = format!("SELECT {COLUMNS} FROM staff WHERE username = ?");
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

/// Active staff holding `role`, by username
pub async fn find_active_by_role(pool: &SqlitePool, role: StaffRole) -> RepoResult<Vec<Staff>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM staff WHERE role = ? AND is_active = 1 ORDER BY username"
    );
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(role)
        .fetch_all(pool)
        .await?;
    Ok(staff)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Staff>> {
    let sql = format!("SELECT {COLUMNS} FROM staff ORDER BY username");
    let staff = sqlx::query_as::<_, Staff>(&sql).fetch_all(pool).await?;
    Ok(staff)
}

pub async fn create(pool: &SqlitePool, data: StaffCreate, now: i64) -> RepoResult<Staff> {
    let username = data.username.trim();
    if username.is_empty() {
        return Err(RepoError::Validation("Username is required".into()));
    }
    if find_by_username(pool, username).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Username '{username}' already exists")));
    }

    let display_name = data
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(username);

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO staff (username, display_name, role, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4) RETURNING id",
    )
    .bind(username)
    .bind(display_name)
    .bind(data.role)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create staff".into()))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Staff> {
    let rows = sqlx::query("UPDATE staff SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Staff {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Staff {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_find_active_by_role() {
        let pool = test_support::pool().await;
        test_support::staff(&pool, "chef", StaffRole::Kitchen).await;
        let sous = test_support::staff(&pool, "sous", StaffRole::Kitchen).await;
        test_support::staff(&pool, "wally", StaffRole::Waiter).await;
        set_active(&pool, sous.id, false).await.unwrap();

        let kitchen = find_active_by_role(&pool, StaffRole::Kitchen).await.unwrap();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].username, "chef");
        assert_eq!(kitchen[0].display_name, "chef");
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let pool = test_support::pool().await;
        test_support::staff(&pool, "chef", StaffRole::Kitchen).await;
        let err = create(
            &pool,
            StaffCreate {
                username: "chef".into(),
                display_name: Some("Other".into()),
                role: StaffRole::Waiter,
            },
            0,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}

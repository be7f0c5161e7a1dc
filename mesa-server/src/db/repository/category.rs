//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, description, display_order, is_active";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category WHERE id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category WHERE name = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Active categories in display order
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM category WHERE is_active = 1 ORDER BY display_order, id"
    );
    let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(categories)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(RepoError::Validation("Category name is required".into()));
    }
    if find_by_name(pool, name).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Category '{name}' already exists")));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO category (name, description, display_order, is_active) VALUES (?1, ?2, ?3, 1) RETURNING id",
    )
    .bind(name)
    .bind(&data.description)
    .bind(data.display_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    if let Some(name) = data.name.as_deref()
        && let Some(existing) = find_by_name(pool, name).await?
        && existing.id != id
    {
        return Err(RepoError::Duplicate(format!("Category '{name}' already exists")));
    }

    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), display_order = COALESCE(?3, display_order), is_active = COALESCE(?4, is_active) WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.display_order)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

pub async fn count_menu_items(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_item WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_duplicate_name() {
        let pool = test_support::pool().await;
        test_support::category(&pool, "Mains").await;
        let err = create(
            &pool,
            CategoryCreate {
                name: "Mains".into(),
                description: None,
                display_order: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_active_in_display_order() {
        let pool = test_support::pool().await;
        let drinks = test_support::category(&pool, "Drinks").await;
        let starters = test_support::category(&pool, "Starters").await;
        update(
            &pool,
            drinks.id,
            CategoryUpdate {
                display_order: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let hidden = test_support::category(&pool, "Hidden").await;
        update(
            &pool,
            hidden.id,
            CategoryUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let names: Vec<String> = find_active(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec![starters.name, drinks.name]);
    }

    #[tokio::test]
    async fn test_rename_to_existing_name_rejected() {
        let pool = test_support::pool().await;
        test_support::category(&pool, "A").await;
        let b = test_support::category(&pool, "B").await;
        let err = update(
            &pool,
            b.id,
            CategoryUpdate {
                name: Some("A".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_delete_with_items_is_referenced() {
        let pool = test_support::pool().await;
        let mains = test_support::category(&pool, "Mains").await;
        test_support::menu_item(&pool, mains.id, "Steak", 21.0).await;

        let err = delete(&pool, mains.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Referenced(_)));
        assert!(find_by_id(&pool, mains.id).await.unwrap().is_some());
    }
}

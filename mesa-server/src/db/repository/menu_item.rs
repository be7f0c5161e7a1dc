//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT m.id, m.name, m.description, m.price, m.category_id, c.name AS category_name, m.image_name, m.image_content_type, m.image_size, m.is_available, m.display_order FROM menu_item m JOIN category c ON c.id = m.category_id";

fn validate_price(price: f64) -> RepoResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(RepoError::Validation(format!(
            "Price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{SELECT} WHERE m.id = ?");
    let item = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{SELECT} WHERE m.category_id = ? ORDER BY m.display_order, m.id");
    let items = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(category_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Orderable items across active categories
pub async fn find_available(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "{SELECT} WHERE m.is_available = 1 AND c.is_active = 1 ORDER BY c.display_order, m.display_order, m.id"
    );
    let items = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    Ok(items)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    validate_price(data.price)?;
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Menu item name is required".into()));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menu_item (name, description, price, category_id, image_name, image_content_type, image_size, is_available, display_order) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_name)
    .bind(&data.image_content_type)
    .bind(data.image_size)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.display_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    if let Some(price) = data.price {
        validate_price(price)?;
    }

    let rows = sqlx::query(
        "UPDATE menu_item SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category_id = COALESCE(?4, category_id), image_name = COALESCE(?5, image_name), image_content_type = COALESCE(?6, image_content_type), image_size = COALESCE(?7, image_size), is_available = COALESCE(?8, is_available), display_order = COALESCE(?9, display_order) WHERE id = ?10",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_name)
    .bind(&data.image_content_type)
    .bind(data.image_size)
    .bind(data.is_available)
    .bind(data.display_order)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Number of order lines that reference this menu item
pub async fn count_order_references(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item WHERE menu_item_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
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
    async fn test_create_joins_category_name() {
        let pool = test_support::pool().await;
        let cat = test_support::category(&pool, "Pasta").await;
        let item = test_support::menu_item(&pool, cat.id, "Carbonara", 12.5).await;
        assert_eq!(item.category_name, "Pasta");
        assert_eq!(item.price, 12.5);
        assert!(item.is_available);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let pool = test_support::pool().await;
        let cat = test_support::category(&pool, "Pasta").await;
        let err = update(
            &pool,
            test_support::menu_item(&pool, cat.id, "Penne", 9.0).await.id,
            MenuItemUpdate {
                price: Some(-1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_available_skips_unavailable() {
        let pool = test_support::pool().await;
        let cat = test_support::category(&pool, "Soups").await;
        let tomato = test_support::menu_item(&pool, cat.id, "Tomato", 5.0).await;
        let onion = test_support::menu_item(&pool, cat.id, "Onion", 6.0).await;
        update(
            &pool,
            onion.id,
            MenuItemUpdate {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let available = find_available(&pool).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, tomato.id);
        assert_eq!(find_by_category(&pool, cat.id).await.unwrap().len(), 2);
    }
}

//! Menu catalog
//!
//! Categories and menu items. The live price of a menu item is only read
//! when an order is placed; order lines keep their own copy.

use crate::db::repository::{RepoError, category, menu_item};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct MenuService {
    pool: SqlitePool,
}

impl MenuService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========== Categories ==========

    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        let name = data.name.trim().to_string();
        let created = category::create(&self.pool, data)
            .await
            .map_err(|e| category_error(e, &name))?;
        tracing::info!(category_id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    pub async fn update_category(&self, category_id: i64, data: CategoryUpdate) -> AppResult<Category> {
        let name = data.name.clone().unwrap_or_default();
        category::update(&self.pool, category_id, data)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => category_not_found(category_id),
                other => category_error(other, &name),
            })
    }

    pub async fn get_category(&self, category_id: i64) -> AppResult<Category> {
        category::find_by_id(&self.pool, category_id)
            .await?
            .ok_or_else(|| category_not_found(category_id))
    }

    /// Active categories by display order
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(category::find_active(&self.pool).await?)
    }

    /// Refused while the category still owns menu items
    pub async fn delete_category(&self, category_id: i64) -> AppResult<()> {
        self.get_category(category_id).await?;
        let owned = category::count_menu_items(&self.pool, category_id).await?;
        if owned > 0 {
            return Err(AppError::new(ErrorCode::CategoryHasMenuItems)
                .with_detail("category_id", category_id)
                .with_detail("menu_items", owned));
        }
        // Items added after the count are caught by the foreign key
        let deleted = category::delete(&self.pool, category_id)
            .await
            .map_err(|e| match e {
                RepoError::Referenced(_) => AppError::new(ErrorCode::CategoryHasMenuItems)
                    .with_detail("category_id", category_id),
                other => other.into(),
            })?;
        if !deleted {
            return Err(category_not_found(category_id));
        }
        tracing::info!(category_id, "Category deleted");
        Ok(())
    }

    // ========== Menu items ==========

    pub async fn create_menu_item(&self, data: MenuItemCreate) -> AppResult<MenuItem> {
        check_price(data.price)?;
        self.get_category(data.category_id).await?;
        let item = menu_item::create(&self.pool, data).await?;
        tracing::info!(menu_item_id = item.id, name = %item.name, price = item.price, "Menu item created");
        Ok(item)
    }

    pub async fn update_menu_item(&self, menu_item_id: i64, data: MenuItemUpdate) -> AppResult<MenuItem> {
        if let Some(price) = data.price {
            check_price(price)?;
        }
        if let Some(category_id) = data.category_id {
            self.get_category(category_id).await?;
        }
        menu_item::update(&self.pool, menu_item_id, data)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => menu_item_not_found(menu_item_id),
                other => other.into(),
            })
    }

    pub async fn get_menu_item(&self, menu_item_id: i64) -> AppResult<MenuItem> {
        menu_item::find_by_id(&self.pool, menu_item_id)
            .await?
            .ok_or_else(|| menu_item_not_found(menu_item_id))
    }

    pub async fn items_by_category(&self, category_id: i64) -> AppResult<Vec<MenuItem>> {
        self.get_category(category_id).await?;
        Ok(menu_item::find_by_category(&self.pool, category_id).await?)
    }

    /// What a customer can order right now
    pub async fn available_items(&self) -> AppResult<Vec<MenuItem>> {
        Ok(menu_item::find_available(&self.pool).await?)
    }

    /// Refused once the item appears in order history
    pub async fn delete_menu_item(&self, menu_item_id: i64) -> AppResult<()> {
        self.get_menu_item(menu_item_id).await?;
        let references = menu_item::count_order_references(&self.pool, menu_item_id).await?;
        if references > 0 {
            return Err(AppError::new(ErrorCode::MenuItemInUse)
                .with_detail("menu_item_id", menu_item_id)
                .with_detail("order_items", references));
        }
        let deleted = menu_item::delete(&self.pool, menu_item_id)
            .await
            .map_err(|e| match e {
                RepoError::Referenced(_) => AppError::new(ErrorCode::MenuItemInUse)
                    .with_detail("menu_item_id", menu_item_id),
                other => other.into(),
            })?;
        if !deleted {
            return Err(menu_item_not_found(menu_item_id));
        }
        tracing::info!(menu_item_id, "Menu item deleted");
        Ok(())
    }
}

fn check_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

fn category_error(err: RepoError, name: &str) -> AppError {
    match err {
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::CategoryNameExists).with_detail("name", name)
        }
        other => other.into(),
    }
}

fn category_not_found(category_id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", category_id)
}

fn menu_item_not_found(menu_item_id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", menu_item_id)
}

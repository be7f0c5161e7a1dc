//! Repository Module
//!
//! Free async functions over `&SqlitePool` (or an open transaction), one
//! module per table. Writes that touch several rows take a transaction.

// Floor
pub mod dining_table;
pub mod table_assignment;

// Menu
pub mod category;
pub mod menu_item;

// Orders
pub mod order;

// People
pub mod notification;
pub mod staff;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Row still referenced by a foreign key
    #[error("Still referenced: {0}")]
    Referenced(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepoError::Referenced(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Referenced(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    //! Seed helpers shared by repository and service tests

    use crate::db::DbService;
    use shared::models::{
        Category, CategoryCreate, DiningTable, DiningTableCreate, MenuItem, MenuItemCreate, Staff,
        StaffCreate, StaffRole,
    };
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::open_in_memory().await.unwrap().pool
    }

    pub async fn table(pool: &SqlitePool, number: i32) -> DiningTable {
        super::dining_table::create(
            pool,
            DiningTableCreate {
                table_number: number,
                capacity: Some(4),
                status: None,
            },
            &format!("qr-{number}"),
            1_000,
        )
        .await
        .unwrap()
    }

    pub async fn category(pool: &SqlitePool, name: &str) -> Category {
        super::category::create(
            pool,
            CategoryCreate {
                name: name.to_string(),
                description: None,
                display_order: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn menu_item(pool: &SqlitePool, category_id: i64, name: &str, price: f64) -> MenuItem {
        super::menu_item::create(
            pool,
            MenuItemCreate {
                name: name.to_string(),
                description: None,
                price,
                category_id,
                image_name: None,
                image_content_type: None,
                image_size: None,
                is_available: None,
                display_order: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn staff(pool: &SqlitePool, username: &str, role: StaffRole) -> Staff {
        super::staff::create(
            pool,
            StaffCreate {
                username: username.to_string(),
                display_name: None,
                role,
            },
            1_000,
        )
        .await
        .unwrap()
    }
}

//! Staff directory
//!
//! Usernames are the notification targets and assignment owners. There is
//! no authentication here.

use crate::db::repository::{RepoError, staff};
use crate::utils::SharedClock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Staff, StaffCreate, StaffRole};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct StaffService {
    pool: SqlitePool,
    clock: SharedClock,
}

impl StaffService {
    pub fn new(pool: SqlitePool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn register(&self, data: StaffCreate) -> AppResult<Staff> {
        let username = data.username.trim().to_string();
        let member = staff::create(&self.pool, data, self.clock.now_millis())
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => {
                    AppError::new(ErrorCode::StaffUsernameExists).with_detail("username", username.as_str())
                }
                other => other.into(),
            })?;
        tracing::info!(username = %member.username, role = %member.role, "Staff registered");
        Ok(member)
    }

    pub async fn get(&self, staff_id: i64) -> AppResult<Staff> {
        staff::find_by_id(&self.pool, staff_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound).with_detail("staff_id", staff_id))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Staff> {
        staff::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::StaffNotFound).with_detail("username", username))
    }

    pub async fn list(&self) -> AppResult<Vec<Staff>> {
        Ok(staff::find_all(&self.pool).await?)
    }

    pub async fn active_by_role(&self, role: StaffRole) -> AppResult<Vec<Staff>> {
        Ok(staff::find_active_by_role(&self.pool, role).await?)
    }

    /// Enable or disable a staff member; disabled staff get no notices
    pub async fn set_active(&self, staff_id: i64, is_active: bool) -> AppResult<Staff> {
        let member = staff::set_active(&self.pool, staff_id, is_active)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => {
                    AppError::new(ErrorCode::StaffNotFound).with_detail("staff_id", staff_id)
                }
                other => other.into(),
            })?;
        tracing::info!(username = %member.username, is_active, "Staff status changed");
        Ok(member)
    }
}

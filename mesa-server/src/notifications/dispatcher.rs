//! Notification dispatcher
//!
//! Turns lifecycle events into notices and picks their recipients:
//! - new order → every active kitchen member
//! - order ready / table request → the table's assigned waiter, or every
//!   active waiter when nobody is assigned

use super::sink::SharedSink;
use crate::db::repository::{RepoError, notification, staff, table_assignment};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Notice, Notification, NotificationType, ReferenceType, StaffRole};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct NotificationDispatcher {
    pool: SqlitePool,
    sink: SharedSink,
}

impl NotificationDispatcher {
    pub fn new(pool: SqlitePool, sink: SharedSink) -> Self {
        Self { pool, sink }
    }

    /// Tell the kitchen about a freshly placed order
    pub async fn new_order(&self, order_id: i64) -> AppResult<usize> {
        let kitchen = staff::find_active_by_role(&self.pool, StaffRole::Kitchen).await?;
        if kitchen.is_empty() {
            tracing::debug!(order_id, "No active kitchen staff, new order notice skipped");
            return Ok(0);
        }

        let message = format!("New order #{} has been placed", order_id);
        for member in &kitchen {
            self.sink.notify(Notice {
                target_username: member.username.clone(),
                message: message.clone(),
                notification_type: NotificationType::NewOrder,
                reference_id: order_id,
                reference_type: ReferenceType::Order,
            });
        }
        Ok(kitchen.len())
    }

    /// Tell the responsible waiter(s) that an order can be served
    pub async fn order_ready(&self, order_id: i64, table_id: i64) -> AppResult<usize> {
        let message = format!("Order #{} is ready for delivery", order_id);
        self.to_table_waiters(
            table_id,
            message,
            NotificationType::OrderReady,
            order_id,
            ReferenceType::Order,
        )
        .await
    }

    /// Forward a customer's request from the table
    pub async fn table_request(
        &self,
        table_id: i64,
        table_number: i32,
        request: &str,
    ) -> AppResult<usize> {
        let message = format!("Table #{} requests: {}", table_number, request);
        self.to_table_waiters(
            table_id,
            message,
            NotificationType::TableRequest,
            table_id,
            ReferenceType::Table,
        )
        .await
    }

    async fn to_table_waiters(
        &self,
        table_id: i64,
        message: String,
        notification_type: NotificationType,
        reference_id: i64,
        reference_type: ReferenceType,
    ) -> AppResult<usize> {
        let targets: Vec<String> =
            match table_assignment::find_active_by_table(&self.pool, table_id).await? {
                Some(assignment) => vec![assignment.waiter_username],
                None => {
                    let waiters =
                        staff::find_active_by_role(&self.pool, StaffRole::Waiter).await?;
                    tracing::debug!(
                        table_id,
                        waiters = waiters.len(),
                        "No waiter assigned, broadcasting to all active waiters"
                    );
                    waiters.into_iter().map(|w| w.username).collect()
                }
            };

        for target in &targets {
            self.sink.notify(Notice {
                target_username: target.clone(),
                message: message.clone(),
                notification_type,
                reference_id,
                reference_type,
            });
        }
        Ok(targets.len())
    }

    /// Unread notifications for a staff member, oldest first
    pub async fn pending_for_user(&self, username: &str) -> AppResult<Vec<Notification>> {
        Ok(notification::find_unread(&self.pool, username).await?)
    }

    pub async fn mark_read(&self, notification_id: i64) -> AppResult<()> {
        notification::mark_read(&self.pool, notification_id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => AppError::new(ErrorCode::NotificationNotFound)
                    .with_detail("notification_id", notification_id),
                other => other.into(),
            })
    }
}

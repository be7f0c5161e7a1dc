//! Order Lifecycle Engine
//!
//! Creates orders, moves orders and order items through their status
//! machines and informs the notification dispatcher. Order status is set by
//! staff; item statuses never roll up into it.

use super::lifecycle::{check_transition, clamp_updated_at};
use crate::core::TransitionPolicy;
use crate::db::repository::order::{self as order_repo, NewOrder, NewOrderLine};
use crate::db::repository::{RepoError, dining_table, menu_item};
use crate::notifications::NotificationDispatcher;
use crate::sessions::SessionRegistry;
use crate::utils::SharedClock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{OrderCreate, OrderDetail, OrderItemDetail, OrderItemStatus, OrderStatus};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Who is placing an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOrigin {
    /// Customer at the table; the session must belong to the order's table
    Customer { session_id: String },
    /// Waiter or kitchen entry, no session involved
    Staff { username: String },
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    clock: SharedClock,
    sessions: Arc<SessionRegistry>,
    dispatcher: NotificationDispatcher,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(
        pool: SqlitePool,
        clock: SharedClock,
        sessions: Arc<SessionRegistry>,
        dispatcher: NotificationDispatcher,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            pool,
            clock,
            sessions,
            dispatcher,
            policy,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Place a new order
    ///
    /// The order starts `PENDING`; every line captures the menu item's
    /// current price.
    pub async fn create_order(&self, origin: OrderOrigin, data: OrderCreate) -> AppResult<OrderDetail> {
        if data.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).with_detail("table_id", data.table_id));
        }
        if let Some(bad) = data.items.iter().find(|item| item.quantity < 1) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity must be at least 1, got {}", bad.quantity),
            )
            .with_detail("menu_item_id", bad.menu_item_id));
        }

        let table = dining_table::find_by_id(&self.pool, data.table_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::TableNotFound).with_detail("table_id", data.table_id)
            })?;

        if let OrderOrigin::Customer { session_id } = &origin {
            self.sessions.validate(table.id, session_id)?;
        }

        let mut lines = Vec::with_capacity(data.items.len());
        for item in &data.items {
            let menu_item = menu_item::find_by_id(&self.pool, item.menu_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::MenuItemNotFound)
                        .with_detail("menu_item_id", item.menu_item_id)
                })?;
            lines.push(NewOrderLine {
                menu_item_id: menu_item.id,
                quantity: item.quantity,
                special_instructions: item.special_instructions.clone(),
                price: menu_item.price,
            });
        }

        let now = self.clock.now_millis();
        let order_id = order_repo::create(
            &self.pool,
            NewOrder {
                table_id: table.id,
                customer_name: data.customer_name,
                special_instructions: data.special_instructions,
            },
            &lines,
            now,
        )
        .await?;

        let detail = self.load(order_id).await?;
        tracing::info!(
            order_id,
            table_id = table.id,
            items = detail.items.len(),
            origin = ?origin,
            "Order created"
        );

        if let Err(e) = self.dispatcher.new_order(order_id).await {
            tracing::warn!(order_id, error = %e, "Failed to dispatch new order notice");
        }
        Ok(detail)
    }

    /// Set an order's status (last writer wins)
    pub async fn update_status(&self, order_id: i64, new_status: OrderStatus) -> AppResult<OrderDetail> {
        let order = order_repo::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        check_transition(self.policy, order.status, new_status)?;

        let updated_at = clamp_updated_at(self.clock.now_millis(), order.created_at);
        order_repo::update_status(&self.pool, order_id, new_status, updated_at)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => order_not_found(order_id),
                other => other.into(),
            })?;

        tracing::info!(
            order_id,
            from = %order.status,
            to = %new_status,
            "Order status changed"
        );

        if new_status == OrderStatus::Ready
            && let Err(e) = self.dispatcher.order_ready(order_id, order.table_id).await
        {
            tracing::warn!(order_id, error = %e, "Failed to dispatch order ready notice");
        }

        self.load(order_id).await
    }

    /// Set one item's status; the order's own status is left alone
    pub async fn update_item_status(
        &self,
        order_id: i64,
        item_id: i64,
        new_status: OrderItemStatus,
    ) -> AppResult<OrderItemDetail> {
        let item = order_repo::find_item(&self.pool, order_id, item_id)
            .await?
            .ok_or_else(|| order_item_not_found(order_id, item_id))?;

        check_transition(self.policy, item.status, new_status)?;

        order_repo::update_item_status(&self.pool, order_id, item_id, new_status)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => order_item_not_found(order_id, item_id),
                other => other.into(),
            })?;

        tracing::info!(
            order_id,
            item_id,
            from = %item.status,
            to = %new_status,
            "Order item status changed"
        );

        order_repo::find_item(&self.pool, order_id, item_id)
            .await?
            .ok_or_else(|| order_item_not_found(order_id, item_id))
    }

    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderDetail> {
        self.load(order_id).await
    }

    pub async fn orders_by_table(&self, table_id: i64) -> AppResult<Vec<OrderDetail>> {
        if dining_table::find_by_id(&self.pool, table_id).await?.is_none() {
            return Err(AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id));
        }
        Ok(order_repo::find_by_table(&self.pool, table_id).await?)
    }

    pub async fn orders_by_status(&self, status: OrderStatus) -> AppResult<Vec<OrderDetail>> {
        Ok(order_repo::find_by_statuses(&self.pool, &[status]).await?)
    }

    /// Kitchen queue: PENDING, CONFIRMED and IN_PROGRESS, oldest first
    pub async fn incoming_orders(&self) -> AppResult<Vec<OrderDetail>> {
        Ok(order_repo::find_by_statuses(
            &self.pool,
            &[
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::InProgress,
            ],
        )
        .await?)
    }

    async fn load(&self, order_id: i64) -> AppResult<OrderDetail> {
        order_repo::find_detail(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn order_item_not_found(order_id: i64, item_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderItemNotFound)
        .with_detail("order_id", order_id)
        .with_detail("item_id", item_id)
}

//! Customer-facing operations, all scoped by a table session

use super::SessionRegistry;
use crate::db::repository::dining_table;
use crate::notifications::NotificationDispatcher;
use crate::orders::{OrderOrigin, OrderService, estimated_time};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{OrderCreate, OrderDetail, OrderStatusView, TableSession};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct CustomerService {
    pool: SqlitePool,
    sessions: Arc<SessionRegistry>,
    orders: OrderService,
    dispatcher: NotificationDispatcher,
}

impl CustomerService {
    pub fn new(
        pool: SqlitePool,
        sessions: Arc<SessionRegistry>,
        orders: OrderService,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            pool,
            sessions,
            orders,
            dispatcher,
        }
    }

    /// Open a session after checking the scanned QR code against the table
    pub async fn start_session(&self, table_id: i64, qr_code: &str) -> AppResult<TableSession> {
        let table = dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id))?;

        if table.qr_code != qr_code {
            tracing::warn!(table_id, "Session rejected: QR code mismatch");
            return Err(AppError::new(ErrorCode::QrCodeMismatch).with_detail("table_id", table_id));
        }

        Ok(self.sessions.open(table.id, table.table_number))
    }

    pub fn validate_session(&self, table_id: i64, session_id: &str) -> AppResult<TableSession> {
        self.sessions.validate(table_id, session_id)
    }

    pub fn end_session(&self, session_id: &str) -> bool {
        self.sessions.end(session_id)
    }

    pub async fn place_order(&self, session_id: &str, data: OrderCreate) -> AppResult<OrderDetail> {
        self.orders
            .create_order(
                OrderOrigin::Customer {
                    session_id: session_id.to_string(),
                },
                data,
            )
            .await
    }

    /// Progress of one of the table's orders
    pub async fn order_status(&self, order_id: i64, session_id: &str) -> AppResult<OrderStatusView> {
        let order = self.orders.get_order(order_id).await?;
        self.sessions.validate(order.order.table_id, session_id)?;

        Ok(OrderStatusView {
            order_id: order.id(),
            status: order.status(),
            created_at: order.order.created_at,
            updated_at: order.order.updated_at,
            estimated_time: estimated_time(order.status()).to_string(),
        })
    }

    /// Orders placed at the session's table
    pub async fn table_orders(&self, table_id: i64, session_id: &str) -> AppResult<Vec<OrderDetail>> {
        self.sessions.validate(table_id, session_id)?;
        self.orders.orders_by_table(table_id).await
    }

    /// Call a waiter to the table
    pub async fn request_assistance(
        &self,
        table_id: i64,
        session_id: &str,
        request: &str,
    ) -> AppResult<()> {
        let session = self.sessions.validate(table_id, session_id)?;
        let request = request.trim();
        if request.is_empty() {
            return Err(AppError::validation("Request text is required"));
        }

        let notified = self
            .dispatcher
            .table_request(session.table_id, session.table_number, request)
            .await?;
        tracing::info!(table_id, notified, "Table assistance requested");
        Ok(())
    }
}

use crate::db::repository::dining_table::TableDeletion;
use crate::db::repository::{RepoError, dining_table, order, staff, table_assignment};
use crate::sessions::SessionRegistry;
use crate::utils::SharedClock;
use crate::utils::time::parse_date;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, QrCodeInfo, TableAssignment,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Table/Assignment Tracker
#[derive(Clone)]
pub struct TableService {
    pool: SqlitePool,
    clock: SharedClock,
    sessions: Arc<SessionRegistry>,
    frontend_url: String,
}

impl TableService {
    pub fn new(
        pool: SqlitePool,
        clock: SharedClock,
        sessions: Arc<SessionRegistry>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            clock,
            sessions,
            frontend_url: frontend_url.into(),
        }
    }

    // ========== Tables ==========

    pub async fn create_table(&self, data: DiningTableCreate) -> AppResult<DiningTable> {
        let table_number = data.table_number;
        let qr_code = new_qr_token();
        let table = dining_table::create(&self.pool, data, &qr_code, self.clock.now_millis())
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AppError::new(ErrorCode::TableNumberExists)
                    .with_detail("table_number", table_number),
                other => other.into(),
            })?;
        tracing::info!(table_id = table.id, table_number, "Dining table created");
        Ok(table)
    }

    pub async fn get_table(&self, table_id: i64) -> AppResult<DiningTable> {
        dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| table_not_found(table_id))
    }

    pub async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.pool).await?)
    }

    pub async fn update_table(&self, table_id: i64, data: DiningTableUpdate) -> AppResult<DiningTable> {
        let table_number = data.table_number;
        dining_table::update(&self.pool, table_id, data, self.clock.now_millis())
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => table_not_found(table_id),
                RepoError::Duplicate(_) => AppError::new(ErrorCode::TableNumberExists)
                    .with_detail("table_number", table_number.unwrap_or_default()),
                other => other.into(),
            })
    }

    /// Delete a table that has no outstanding orders
    ///
    /// Its assignments and order history go with it; open sessions are revoked.
    pub async fn delete_table(&self, table_id: i64) -> AppResult<()> {
        match dining_table::delete_cascade(&self.pool, table_id).await? {
            TableDeletion::Deleted => {}
            TableDeletion::Missing => return Err(table_not_found(table_id)),
            TableDeletion::HasActiveOrders => {
                return Err(AppError::new(ErrorCode::TableHasOrders).with_detail("table_id", table_id));
            }
        }
        let revoked = self.sessions.revoke_table(table_id);
        tracing::info!(table_id, revoked_sessions = revoked, "Dining table deleted");
        Ok(())
    }

    /// Issue a fresh QR token; sessions opened with the old one are revoked
    pub async fn rotate_qr_code(&self, table_id: i64) -> AppResult<QrCodeInfo> {
        let token = new_qr_token();
        let table = dining_table::update_qr_code(&self.pool, table_id, &token, self.clock.now_millis())
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => table_not_found(table_id),
                other => other.into(),
            })?;
        self.sessions.revoke_table(table_id);
        tracing::info!(table_id, "Table QR code rotated");
        Ok(self.qr_code_info(&table))
    }

    /// QR code payload for the table's current token
    pub async fn qr_code(&self, table_id: i64) -> AppResult<QrCodeInfo> {
        let table = self.get_table(table_id).await?;
        Ok(self.qr_code_info(&table))
    }

    fn qr_code_info(&self, table: &DiningTable) -> QrCodeInfo {
        QrCodeInfo {
            table_id: table.id,
            table_number: table.table_number,
            qr_code_data: table.qr_code.clone(),
            qr_code_url: format!(
                "{}/table/{}?code={}",
                self.frontend_url, table.id, table.qr_code
            ),
        }
    }

    // ========== Assignments ==========

    /// Make `waiter_username` the only active waiter of the table
    pub async fn assign(
        &self,
        table_id: i64,
        waiter_username: &str,
        shift_date: &str,
    ) -> AppResult<TableAssignment> {
        let shift_date = parse_date(shift_date)?.format("%Y-%m-%d").to_string();
        self.get_table(table_id).await?;

        match staff::find_by_username(&self.pool, waiter_username).await? {
            Some(member) if member.is_active => {}
            _ => {
                return Err(AppError::new(ErrorCode::StaffNotFound)
                    .with_detail("username", waiter_username));
            }
        }

        let assignment = table_assignment::assign(
            &self.pool,
            table_id,
            waiter_username,
            &shift_date,
            self.clock.now_millis(),
        )
        .await
        .map_err(|e| match e {
            // Concurrent assigns are settled by the partial unique index
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            other => other.into(),
        })?;

        tracing::info!(
            table_id,
            waiter = %waiter_username,
            shift_date = %assignment.shift_date,
            "Table assigned"
        );
        Ok(assignment)
    }

    /// Returns whether an active assignment existed
    pub async fn unassign(&self, table_id: i64) -> AppResult<bool> {
        self.get_table(table_id).await?;
        let changed = table_assignment::deactivate_all(&self.pool, table_id).await?;
        tracing::info!(table_id, deactivated = changed, "Table unassigned");
        Ok(changed > 0)
    }

    pub async fn has_active_orders(&self, table_id: i64) -> AppResult<bool> {
        Ok(order::has_active_orders(&self.pool, table_id).await?)
    }

    pub async fn tables_for_waiter(&self, waiter_username: &str) -> AppResult<Vec<TableAssignment>> {
        Ok(table_assignment::find_active_by_waiter(&self.pool, waiter_username).await?)
    }

    pub async fn current_waiter(&self, table_id: i64) -> AppResult<Option<TableAssignment>> {
        self.get_table(table_id).await?;
        Ok(table_assignment::find_active_by_table(&self.pool, table_id).await?)
    }
}

fn new_qr_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn table_not_found(table_id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{order::NewOrder, order::NewOrderLine, test_support};
    use crate::utils::ManualClock;
    use shared::models::{OrderStatus, StaffRole, TableStatus};

    struct Fixture {
        pool: SqlitePool,
        sessions: Arc<SessionRegistry>,
        service: TableService,
    }

    async fn fixture() -> Fixture {
        let pool = test_support::pool().await;
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let sessions = Arc::new(SessionRegistry::new(clock.clone(), 3_600_000));
        let service = TableService::new(
            pool.clone(),
            clock,
            sessions.clone(),
            "https://mesa.example",
        );
        test_support::staff(&pool, "ana", StaffRole::Waiter).await;
        test_support::staff(&pool, "ben", StaffRole::Waiter).await;
        Fixture {
            pool,
            sessions,
            service,
        }
    }

    fn new_table(number: i32) -> DiningTableCreate {
        DiningTableCreate {
            table_number: number,
            capacity: Some(2),
            status: None,
        }
    }

    async fn place_order(pool: &SqlitePool, table_id: i64) -> i64 {
        let cat = test_support::category(pool, &format!("Cat {table_id}")).await;
        let item = test_support::menu_item(pool, cat.id, "Soup", 4.5).await;
        order::create(
            pool,
            NewOrder {
                table_id,
                customer_name: None,
                special_instructions: None,
            },
            &[NewOrderLine {
                menu_item_id: item.id,
                quantity: 1,
                special_instructions: None,
                price: 4.5,
            }],
            1_700_000_000_000,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_table_mints_qr_code() {
        let f = fixture().await;
        let a = f.service.create_table(new_table(1)).await.unwrap();
        let b = f.service.create_table(new_table(2)).await.unwrap();
        assert_eq!(a.status, TableStatus::Available);
        assert_eq!(a.qr_code.len(), 32);
        assert_ne!(a.qr_code, b.qr_code);

        let err = f.service.create_table(new_table(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNumberExists);
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_and_list() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(3)).await.unwrap();
        f.service.create_table(new_table(1)).await.unwrap();

        let updated = f
            .service
            .update_table(
                t.id,
                DiningTableUpdate {
                    status: Some(TableStatus::Occupied),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TableStatus::Occupied);
        assert_eq!(updated.capacity, 2);

        let numbers: Vec<i32> = f
            .service
            .list_tables()
            .await
            .unwrap()
            .iter()
            .map(|t| t.table_number)
            .collect();
        assert_eq!(numbers, vec![1, 3]);

        let err = f
            .service
            .update_table(999, DiningTableUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_rotate_qr_code_revokes_sessions() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(7)).await.unwrap();
        let session = f.sessions.open(t.id, t.table_number);

        let info = f.service.rotate_qr_code(t.id).await.unwrap();
        assert_ne!(info.qr_code_data, t.qr_code);
        assert_eq!(
            info.qr_code_url,
            format!("https://mesa.example/table/{}?code={}", t.id, info.qr_code_data)
        );
        assert!(f.sessions.get(&session.session_id).is_none());
        assert_eq!(f.service.qr_code(t.id).await.unwrap(), info);
    }

    #[tokio::test]
    async fn test_assign_replaces_active_waiter() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(4)).await.unwrap();

        f.service.assign(t.id, "ana", "2024-03-01").await.unwrap();
        let second = f.service.assign(t.id, "ben", "2024-03-01").await.unwrap();
        assert_eq!(second.waiter_username, "ben");

        assert_eq!(table_assignment::count_active(&f.pool, t.id).await.unwrap(), 1);
        let current = f.service.current_waiter(t.id).await.unwrap().unwrap();
        assert_eq!(current.waiter_username, "ben");
        assert!(f.service.tables_for_waiter("ana").await.unwrap().is_empty());
        assert_eq!(f.service.tables_for_waiter("ben").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_validation() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(5)).await.unwrap();

        let err = f.service.assign(t.id, "nobody", "2024-03-01").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StaffNotFound);

        let err = f.service.assign(404, "ana", "2024-03-01").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        let err = f.service.assign(t.id, "ana", "03/01/2024").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_unassign() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(6)).await.unwrap();
        assert!(!f.service.unassign(t.id).await.unwrap());

        f.service.assign(t.id, "ana", "2024-03-01").await.unwrap();
        assert!(f.service.unassign(t.id).await.unwrap());
        assert!(f.service.current_waiter(t.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_table_gated_by_active_orders() {
        let f = fixture().await;
        let t = f.service.create_table(new_table(9)).await.unwrap();
        f.service.assign(t.id, "ana", "2024-03-01").await.unwrap();
        let order_id = place_order(&f.pool, t.id).await;
        assert!(f.service.has_active_orders(t.id).await.unwrap());

        let err = f.service.delete_table(t.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableHasOrders);
        assert!(err.is_conflict());

        order::update_status(&f.pool, order_id, OrderStatus::Delivered, 1_700_000_100_000)
            .await
            .unwrap();
        assert!(!f.service.has_active_orders(t.id).await.unwrap());

        let session = f.sessions.open(t.id, t.table_number);
        f.service.delete_table(t.id).await.unwrap();
        assert!(f.sessions.get(&session.session_id).is_none());
        assert!(order::find_by_id(&f.pool, order_id).await.unwrap().is_none());

        let err = f.service.get_table(t.id).await.unwrap_err();
        assert!(err.is_not_found());
        let err = f.service.delete_table(t.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }
}

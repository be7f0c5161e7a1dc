use parking_lot::Mutex;
use shared::error::{AppError, AppResult};
use shared::models::Notice;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::db::DbService;
use crate::menu::MenuService;
use crate::notifications::{NotificationDispatcher, NotificationService, NotificationWorker};
use crate::orders::OrderService;
use crate::reports::ReportsService;
use crate::sessions::{CustomerService, SessionRegistry};
use crate::staff::StaffService;
use crate::tables::TableService;
use crate::utils::{SharedClock, SystemClock};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | clock | 可注入时钟 |
/// | sessions | 桌台会话注册表 (进程内唯一) |
/// | notifications | 通知通道 (fire-and-forget) |
/// | orders / customers / tables / menu / staff / reports | 各业务服务 |
///
/// Clone 成本很低：全部是连接池、Arc 或仅含它们的服务。
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub clock: SharedClock,
    pub sessions: Arc<SessionRegistry>,
    pub notifications: Arc<NotificationService>,
    pub dispatcher: NotificationDispatcher,
    pub orders: OrderService,
    pub customers: CustomerService,
    pub tables: TableService,
    pub menu: MenuService,
    pub staff: StaffService,
    pub reports: ReportsService,
    /// 由 [`ServerState::start_background_tasks`] 取走，仅一次
    notification_rx: Arc<Mutex<Option<mpsc::Receiver<Notice>>>>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 工作目录
    /// 2. 数据库 (迁移)
    /// 3. 会话注册表、通知通道和各业务服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(Path::new(&config.work_dir)).map_err(|e| {
            AppError::internal(format!("Failed to create work dir {}: {e}", config.work_dir))
        })?;

        let db = DbService::open(&config.database_url).await?;
        let state = Self::build(config.clone(), db, Arc::new(SystemClock));
        tracing::info!(
            environment = %config.environment,
            timezone = %config.business_timezone,
            policy = ?config.transition_policy,
            "Server state initialized"
        );
        Ok(state)
    }

    /// 内存数据库 + 注入时钟 (测试用)
    pub async fn in_memory(config: Config, clock: SharedClock) -> AppResult<Self> {
        let db = DbService::open_in_memory().await?;
        Ok(Self::build(config, db, clock))
    }

    fn build(config: Config, db: DbService, clock: SharedClock) -> Self {
        let pool = db.pool.clone();
        let sessions = Arc::new(SessionRegistry::new(clock.clone(), config.session_ttl_millis()));
        let (notifications, notification_rx) = NotificationService::new(config.notification_buffer);
        let dispatcher = NotificationDispatcher::new(pool.clone(), notifications.clone());

        let orders = OrderService::new(
            pool.clone(),
            clock.clone(),
            sessions.clone(),
            dispatcher.clone(),
            config.transition_policy,
        );
        let customers = CustomerService::new(
            pool.clone(),
            sessions.clone(),
            orders.clone(),
            dispatcher.clone(),
        );
        let tables = TableService::new(
            pool.clone(),
            clock.clone(),
            sessions.clone(),
            config.frontend_url.clone(),
        );
        let menu = MenuService::new(pool.clone());
        let staff = StaffService::new(pool.clone(), clock.clone());
        let reports = ReportsService::new(pool, clock.clone(), config.business_timezone);

        Self {
            config,
            db,
            clock,
            sessions,
            notifications,
            dispatcher,
            orders,
            customers,
            tables,
            menu,
            staff,
            reports,
            notification_rx: Arc::new(Mutex::new(Some(notification_rx))),
        }
    }

    /// 启动后台任务
    ///
    /// - notification_worker: 持久化通知
    /// - session_sweeper: 定时清理过期会话
    ///
    /// 只能调用一次；通知接收端被 worker 取走。
    pub fn start_background_tasks(&self) -> AppResult<BackgroundTasks> {
        let rx = self
            .notification_rx
            .lock()
            .take()
            .ok_or_else(|| AppError::internal("Background tasks already started"))?;

        let mut tasks = BackgroundTasks::new();

        let worker = NotificationWorker::new(self.db.pool.clone(), self.clock.clone());
        let token = tasks.shutdown_token();
        tasks.spawn("notification_worker", TaskKind::Worker, worker.run(rx, token));

        let sessions = self.sessions.clone();
        tasks.spawn_periodic(
            "session_sweeper",
            Duration::from_secs(self.config.session_sweep_interval_secs),
            move || {
                let sessions = sessions.clone();
                async move {
                    let purged = sessions.purge_expired();
                    if purged > 0 {
                        tracing::info!(purged, remaining = sessions.len(), "Expired sessions purged");
                    }
                }
            },
        );

        tasks.log_summary();
        Ok(tasks)
    }
}

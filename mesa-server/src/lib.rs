//! Mesa Server - 堂食点餐核心
//!
//! # 架构概述
//!
//! - **会话** (`sessions`): 扫码开台的临时会话，纯内存、有过期时间
//! - **订单** (`orders`): 订单与菜品状态机、时间戳、价格快照
//! - **通知** (`notifications`): 单向通知后厨/服务员，异步落库
//! - **报表** (`reports`): 销售、热销菜品、出餐时长，按需重算
//! - **桌台** (`tables`): 桌台、二维码、服务员分配
//!
//! # 模块结构
//!
//! ```text
//! mesa-server/src/
//! ├── core/           # 配置、状态、后台任务
//! ├── db/             # SQLite 连接池与 repository
//! ├── sessions/       # 会话注册表、顾客操作
//! ├── orders/         # 订单生命周期
//! ├── notifications/  # 通知分发与持久化
//! ├── tables/         # 桌台与分配
//! ├── menu/           # 分类与菜品
//! ├── staff/          # 员工目录
//! ├── reports/        # 报表聚合
//! └── utils/          # 时钟、日志、时间窗口
//! ```

pub mod core;
pub mod db;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod reports;
pub mod sessions;
pub mod staff;
pub mod tables;
pub mod utils;

// 公共类型
pub use core::{BackgroundTasks, Config, ServerState, TransitionPolicy};
pub use db::DbService;
pub use orders::{OrderOrigin, OrderService};
pub use sessions::{CustomerService, SessionRegistry};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// 日志初始化
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (.env, 配置, 日志)
///
/// 配置错误发生在日志初始化之前，由调用方输出到 stderr。
pub fn setup_environment() -> AppResult<Config> {
    // 缺少 .env 文件不是错误
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /__  _________ _
  / /|_/ / _ \/ ___/ __ `/
 / /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
    "#
    );
}

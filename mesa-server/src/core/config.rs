use chrono_tz::Tz;
use shared::error::{AppError, AppResult, ErrorCode};
use std::str::FromStr;

/// 订单生命周期对非法状态跳转的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// 接受任意目标状态，非法跳转只记录警告
    #[default]
    Permissive,
    /// 非法跳转返回 `InvalidStatusTransition`
    Strict,
}

impl FromStr for TransitionPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(AppError::with_message(
                ErrorCode::ConfigError,
                format!("Unknown transition policy: {other}"),
            )),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_URL | sqlite:<WORK_DIR>/mesa.db | 数据库地址 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 滚动日志目录 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BUSINESS_TIMEZONE | UTC | 业务时区 (IANA) |
/// | SESSION_TTL_HOURS | 4 | 桌台会话有效期 |
/// | SESSION_SWEEP_INTERVAL_SECS | 300 | 过期会话清理间隔 |
/// | NOTIFICATION_BUFFER | 256 | 通知队列容量 |
/// | ORDER_TRANSITION_POLICY | permissive | permissive / strict |
/// | FRONTEND_URL | http://localhost:3000 | 二维码链接前缀 |
///
/// # 示例
///
/// ```ignore
/// BUSINESS_TIMEZONE=Europe/Madrid SESSION_TTL_HOURS=2 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    pub database_url: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub business_timezone: Tz,
    pub session_ttl_hours: i64,
    pub session_sweep_interval_secs: u64,
    pub notification_buffer: usize,
    pub transition_policy: TransitionPolicy,
    pub frontend_url: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值查找函数构建配置 (测试传入 map)
    ///
    /// 数值解析失败时使用默认值；未知时区或跳转策略视为配置错误。
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let work_dir = lookup("WORK_DIR").unwrap_or_else(|| "./data".into());
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite:{}/mesa.db", work_dir.trim_end_matches('/')));

        let business_timezone = match lookup("BUSINESS_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|_| {
                AppError::with_message(
                    ErrorCode::ConfigError,
                    format!("Unknown business timezone: {name}"),
                )
            })?,
            None => Tz::UTC,
        };

        let transition_policy = match lookup("ORDER_TRANSITION_POLICY") {
            Some(value) => value.parse()?,
            None => TransitionPolicy::default(),
        };

        Ok(Self {
            database_url,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR").filter(|dir| !dir.is_empty()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            business_timezone,
            session_ttl_hours: lookup("SESSION_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(4),
            session_sweep_interval_secs: lookup("SESSION_SWEEP_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(300),
            notification_buffer: lookup("NOTIFICATION_BUFFER")
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(256),
            transition_policy,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            work_dir,
        })
    }

    /// 仅默认值，不读取进程环境变量
    pub fn defaults() -> Self {
        Self {
            work_dir: "./data".into(),
            database_url: "sqlite:./data/mesa.db".into(),
            log_level: "info".into(),
            log_dir: None,
            environment: "development".into(),
            business_timezone: Tz::UTC,
            session_ttl_hours: 4,
            session_sweep_interval_secs: 300,
            notification_buffer: 256,
            transition_policy: TransitionPolicy::Permissive,
            frontend_url: "http://localhost:3000".into(),
        }
    }

    /// 会话有效期 (毫秒)
    pub fn session_ttl_millis(&self) -> i64 {
        self.session_ttl_hours * 60 * 60 * 1_000
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

//! 工具模块 - 通用工具函数和类型
//!
//! - [`clock`] - 可注入时钟
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区与报表窗口

pub mod clock;
pub mod logger;
pub mod time;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorKind};

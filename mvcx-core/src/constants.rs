//! 配置键与核心服务名称常量
//!
//! 宏、容器与各启动任务使用同一组标识符，避免硬编码不一致

// ==================== 日志配置 ====================

/// 日志级别
pub const LOGGING_LEVEL: &str = "mvcx.logging.level";

/// 日志格式（compact / full / json / pretty）
pub const LOGGING_FORMAT: &str = "mvcx.logging.format";

/// 自定义过滤器，例如 "mvcx_web=debug"
pub const LOGGING_FILTER: &str = "mvcx.logging.filter";

// ==================== 核心服务 ====================

/// Environment 在容器中的名称
pub const ENVIRONMENT_SERVICE_NAME: &str = "environment";

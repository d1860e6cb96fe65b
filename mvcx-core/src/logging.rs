//! 日志初始化
//!
//! 从 [`Environment`] 的 `mvcx.logging.*` 读取配置，安装全局 `tracing` 订阅者。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::bootstrapper::{BootstrapperTask, TaskContinuation};
use crate::config::Environment;
use crate::constants::{LOGGING_FILTER, LOGGING_FORMAT, LOGGING_LEVEL};
use crate::error::{ApplicationError, ApplicationResult, Result};

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ApplicationError;

    fn from_str(s: &str) -> ApplicationResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ApplicationError::Config(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> ApplicationResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ApplicationError::Config(format!("Invalid log format: {}", s))),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,

    /// `EnvFilter` 指令，例如 "mvcx_web=debug"；优先于 `level`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 读取 `mvcx.logging.level` / `mvcx.logging.format` / `mvcx.logging.filter`
    ///
    /// 缺省的键使用默认值，无法识别的值是配置错误。
    pub fn from_environment(env: &Environment) -> ApplicationResult<Self> {
        let mut config = Self::default();

        if let Some(level) = env.get_string(LOGGING_LEVEL) {
            config.level = level.parse()?;
        }
        if let Some(format) = env.get_string(LOGGING_FORMAT) {
            config.format = format.parse()?;
        }
        config.filter = env.get_string(LOGGING_FILTER).filter(|filter| !filter.trim().is_empty());

        Ok(config)
    }

    /// 构造过滤器：显式 filter，其次 `RUST_LOG`，最后是 level
    pub fn env_filter(&self) -> ApplicationResult<EnvFilter> {
        match &self.filter {
            Some(filter) => EnvFilter::try_new(filter)
                .map_err(|e| ApplicationError::Config(format!("Invalid log filter '{}': {}", filter, e))),
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))),
        }
    }

    /// 安装全局订阅者；进程内只能成功一次
    pub fn init(&self) -> ApplicationResult<()> {
        let filter = self.env_filter()?;
        let builder = tracing_subscriber::fmt().with_env_filter(filter);

        let installed = match self.format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Full => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };
        installed.map_err(|e| ApplicationError::LoggingInitFailed(e.to_string()))
    }
}

/// 启动任务：按 Environment 初始化日志
///
/// 已有全局订阅者时（例如宿主程序自己装了一个）只校验配置，不再安装。
pub struct InitializeLogging {
    environment: Arc<Environment>,
}

impl InitializeLogging {
    pub fn new(environment: Arc<Environment>) -> Self {
        Self { environment }
    }
}

impl BootstrapperTask for InitializeLogging {
    fn name(&self) -> &str {
        "InitializeLogging"
    }

    fn execute(&self) -> Result<TaskContinuation> {
        let config = LoggingConfig::from_environment(&self.environment)?;

        if tracing::dispatcher::has_been_set() {
            config.env_filter()?;
            tracing::debug!("Global subscriber already installed, keeping it");
        } else {
            config.init()?;
            tracing::info!("Logging initialized: level={}, format={:?}", config.level, config.format);
        }

        Ok(TaskContinuation::Continue)
    }
}

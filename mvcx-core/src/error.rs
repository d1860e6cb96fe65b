/// 统一的错误处理类型
///
/// 应用边界使用 anyhow::Result，通过 .context() 方法添加错误上下文信息。
/// 容器与应用启动各自有明确的错误枚举。
///
/// # 示例
///
/// ```rust,ignore
/// use anyhow::{Context, Result};
///
/// fn execute(&self) -> Result<TaskContinuation> {
///     let catalog = self.container.get_instance::<ControllerCatalog>()
///         .context("ControllerCatalog is not registered")?;
///     // ...
/// }
/// ```
pub use anyhow::Result;

use thiserror::Error;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Service already exists: {0}")]
    ServiceAlreadyExists(String),

    #[error("Type mismatch for service: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Service creation failed: {0}")]
    CreationFailed(String),
}

pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}

pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

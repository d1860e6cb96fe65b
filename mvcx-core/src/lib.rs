// mvcx-core: mvcx 的基础设施
//
// 提供：
// - 配置（Environment 与多种配置源）
// - 日志初始化
// - 最小化的服务容器（register / resolve）
// - 按顺序执行的启动任务管道

pub mod bootstrapper;
pub mod config;
pub mod constants;
pub mod container;
pub mod error;
pub mod logging;
pub mod scope;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use bootstrapper::{BootstrapReport, Bootstrapper, BootstrapperTask, TaskContinuation};
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use constants::*;
pub use container::{ContainerAdapter, ContainerAdapterExt, ServiceContainer, SharedService};
pub use error::{
    ApplicationError, ApplicationResult, ContainerError, ContainerResult, Result,
};
pub use logging::{InitializeLogging, LogFormat, LogLevel, LoggingConfig};
pub use scope::Lifetime;
pub use service::{ErasedFactory, FunctionFactory, ServiceDefinition, ServiceFactory};

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bootstrapper::{Bootstrapper, BootstrapperTask, TaskContinuation};
    pub use crate::config::{ConfigValue, Environment, PropertySource};
    pub use crate::container::{ContainerAdapter, ContainerAdapterExt, ServiceContainer};
    pub use crate::error::{ApplicationError, ApplicationResult, ContainerError, ContainerResult, Result};
    pub use crate::logging::{InitializeLogging, LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Lifetime;
    pub use crate::utils;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}

//! # mvcx-web
//!
//! MVC 约定层：REST 风格的路由生成和控制器自动注册。
//!
//! - **能力声明** - 控制器通过 [`RestfulController`] 显式声明支持的 REST 动作
//! - **约定路由** - [`RouteTable`] 按固定顺序生成 new/edit/update/destroy/show/create/index
//! - **控制器目录** - `register_controller!` 编译时登记，[`ControllerCatalog::discover`] 收集
//! - **启动任务** - [`RegisterControllers`] 把控制器注册为瞬态服务
//!
//! 路由匹配与请求分发由宿主框架负责。

pub mod capability;
pub mod constants;
pub mod controller;
pub mod error;
pub mod register_controllers;
pub mod routing;

pub use capability::{RestCapabilities, RestfulController};
pub use controller::{ControllerCatalog, ControllerRegistration};
pub use error::{RouteError, RouteResult};
pub use register_controllers::{RegisterControllers, RegisterControllersSettings};
pub use routing::{ActionConstraint, RouteDefinition, RouteTable};

// register_controller! 宏展开时使用
pub use inventory;

pub mod prelude {
    //! 预导入模块

    pub use crate::capability::{RestCapabilities, RestfulController};
    pub use crate::controller::{ControllerCatalog, ControllerRegistration};
    pub use crate::error::{RouteError, RouteResult};
    pub use crate::register_controller;
    pub use crate::register_controllers::{RegisterControllers, RegisterControllersSettings};
    pub use crate::routing::{ActionConstraint, RouteDefinition, RouteTable};

    pub use mvcx_validator::{
        ModelMetadataConfiguration, ModelMetadataRegistry, ModelValidationPipeline,
        RegisterValidation,
    };

    pub use http::Method;
}

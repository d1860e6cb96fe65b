//! mvcx-web 使用的配置键与约定名称

// ==================== 控制器注册配置 ====================

/// 是否跳过控制器注册
pub const CONTROLLERS_EXCLUDED: &str = "mvcx.controllers.excluded";

/// 忽略的控制器类型（完整类型名或短类型名）
pub const CONTROLLERS_IGNORED: &str = "mvcx.controllers.ignored";

/// 忽略的控制器来源（crate 或模块路径前缀）
pub const CONTROLLERS_EXCLUDED_ORIGINS: &str = "mvcx.controllers.excluded-origins";

/// 默认忽略框架自身提供的控制器
pub const DEFAULT_EXCLUDED_ORIGINS: &[&str] = &["mvcx_web"];

// ==================== 容器服务名称 ====================

/// 控制器目录在容器中的名称
pub const CONTROLLER_CATALOG: &str = "controllerCatalog";

// ==================== REST 约定 ====================

/// 路由中资源标识的参数名
pub const ID_PARAMETER_NAME: &str = "id";

/// 路由中资源标识的占位段
pub const ID_PARAMETER_SEGMENT: &str = "{id}";

/// 约定的动作名称
pub mod action_names {
    pub const NEW: &str = "New";
    pub const EDIT: &str = "Edit";
    pub const UPDATE: &str = "Update";
    pub const DESTROY: &str = "Destroy";
    pub const SHOW: &str = "Show";
    pub const CREATE: &str = "Create";
    pub const INDEX: &str = "Index";
}

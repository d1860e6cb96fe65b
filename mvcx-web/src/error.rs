use thiserror::Error;

/// 路由生成错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// 类型名中找不到 "Controller"，或去掉后为空
    #[error("Invalid controller name: '{0}' (type name must contain 'Controller' after a non-empty prefix)")]
    InvalidControllerName(String),

    #[error("Duplicate route name: {0}")]
    DuplicateRoute(String),
}

pub type RouteResult<T> = Result<T, RouteError>;

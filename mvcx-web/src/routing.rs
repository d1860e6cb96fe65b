//! REST 约定路由
//!
//! 根据控制器声明的 [`RestCapabilities`] 生成固定顺序的路由定义。
//! 这里只产出数据，路由匹配与分发交给宿主框架。

use http::Method;
use serde::{Serialize, Serializer};

use mvcx_core::utils::naming;

use crate::capability::{RestCapabilities, RestfulController};
use crate::constants::{action_names, ID_PARAMETER_SEGMENT};
use crate::controller::ControllerCatalog;
use crate::error::{RouteError, RouteResult};

/// 动作约束：HTTP 方法 + 是否需要资源标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionConstraint {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub requires_id: bool,
}

impl ActionConstraint {
    pub fn new(method: Method, requires_id: bool) -> Self {
        Self { method, requires_id }
    }

    /// 请求是否满足约束
    pub fn allows(&self, method: &Method, id: Option<&str>) -> bool {
        if self.method != *method {
            return false;
        }
        !self.requires_id || id.is_some_and(|id| !id.trim().is_empty())
    }
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// 路由定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    /// 路由名称，例如 `products-edit`
    pub name: String,
    /// URL 模板，例如 `products/{id}/edit`
    pub url: String,
    pub controller: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub constraint: ActionConstraint,
}

/// 从类型名推导控制器名
///
/// 取短类型名中第一个 "Controller"（不区分大小写）之前的部分：
/// `app::ProductsController` → `Products`。
pub fn controller_name(type_name: &str) -> RouteResult<String> {
    let short = naming::short_type_name(type_name);
    let short = short.split('<').next().unwrap_or(short);

    match short.to_ascii_lowercase().find("controller") {
        Some(index) if index > 0 => Ok(short[..index].to_string()),
        _ => Err(RouteError::InvalidControllerName(type_name.to_string())),
    }
}

/// 生成约定路由，顺序固定为 new, edit, update, destroy, show, create, index
pub fn conventional_routes(
    type_name: &str,
    capabilities: RestCapabilities,
    area: Option<&str>,
) -> RouteResult<Vec<RouteDefinition>> {
    let controller = controller_name(type_name)?;

    let route = |action: &str, method: Method, url_tail: &[&str], requires_id: bool| {
        let mut segments: Vec<&str> = Vec::with_capacity(url_tail.len() + 2);
        segments.extend(area);
        segments.push(&controller);

        let mut name_segments = segments.clone();
        name_segments.push(action);
        segments.extend_from_slice(url_tail);

        RouteDefinition {
            name: naming::join_lowercase(&name_segments, "-"),
            url: naming::join_lowercase(&segments, "/"),
            controller: controller.clone(),
            action: action.to_string(),
            area: area.map(str::to_string),
            constraint: ActionConstraint::new(method, requires_id),
        }
    };

    let mut routes = Vec::new();

    if capabilities.supports_create() {
        routes.push(route(action_names::NEW, Method::GET, &[action_names::NEW], false));
    }
    if capabilities.supports_update() {
        routes.push(route(
            action_names::EDIT,
            Method::GET,
            &[ID_PARAMETER_SEGMENT, action_names::EDIT],
            true,
        ));
        routes.push(route(action_names::UPDATE, Method::PUT, &[ID_PARAMETER_SEGMENT], true));
    }
    if capabilities.supports_destroy() {
        routes.push(route(action_names::DESTROY, Method::DELETE, &[ID_PARAMETER_SEGMENT], true));
    }
    if capabilities.supports_details() {
        routes.push(route(action_names::SHOW, Method::GET, &[ID_PARAMETER_SEGMENT], true));
    }
    if capabilities.supports_create() {
        routes.push(route(action_names::CREATE, Method::POST, &[], false));
    }
    if capabilities.supports_list() {
        routes.push(route(action_names::INDEX, Method::GET, &[], false));
    }

    Ok(routes)
}

/// 路由表
///
/// 路由按添加顺序保存，名称唯一。
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加单条路由
    pub fn add(&mut self, route: RouteDefinition) -> RouteResult<()> {
        self.extend(vec![route])
    }

    /// 为控制器 `C` 添加 REST 路由
    pub fn resources<C: RestfulController>(&mut self) -> RouteResult<&mut Self> {
        self.map_controller(std::any::type_name::<C>(), C::CAPABILITIES, None)?;
        Ok(self)
    }

    /// 为区域内的控制器 `C` 添加 REST 路由
    pub fn map_resources<C: RestfulController>(&mut self, area: &str) -> RouteResult<&mut Self> {
        self.map_controller(std::any::type_name::<C>(), C::CAPABILITIES, Some(area))?;
        Ok(self)
    }

    /// 按类型名和能力添加 REST 路由
    pub fn map_controller(
        &mut self,
        type_name: &str,
        capabilities: RestCapabilities,
        area: Option<&str>,
    ) -> RouteResult<()> {
        let routes = conventional_routes(type_name, capabilities, area)?;
        tracing::debug!("Mapping {} REST route(s) for {}", routes.len(), type_name);
        self.extend(routes)
    }

    /// 为目录中所有声明了能力的控制器添加路由
    pub fn map_catalog(&mut self, catalog: &ControllerCatalog) -> RouteResult<()> {
        for registration in catalog.registrations() {
            if registration.capabilities.is_empty() {
                continue;
            }
            self.map_controller(registration.type_name, registration.capabilities, None)?;
        }
        Ok(())
    }

    /// 整批添加；有重名时一条都不添加
    fn extend(&mut self, routes: Vec<RouteDefinition>) -> RouteResult<()> {
        for (index, route) in routes.iter().enumerate() {
            let clashes = self.find(&route.name).is_some()
                || routes[..index].iter().any(|earlier| earlier.name == route.name);
            if clashes {
                return Err(RouteError::DuplicateRoute(route.name.clone()));
            }
        }

        for route in &routes {
            tracing::trace!(
                "Route '{}': {} {} -> {}#{}",
                route.name,
                route.constraint.method,
                route.url,
                route.controller,
                route.action
            );
        }
        self.routes.extend(routes);
        Ok(())
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn find(&self, name: &str) -> Option<&RouteDefinition> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 以 JSON 导出路由表
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.routes)
    }
}

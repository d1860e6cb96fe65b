//! 控制器登记与目录
//!
//! 控制器通过 [`register_controller!`](crate::register_controller) 在编译时登记，
//! 启动时由 [`ControllerCatalog::discover`] 收集成目录，供注册任务和路由生成使用。

use std::any::{type_name, Any, TypeId};

use mvcx_core::service::ServiceInstance;
use mvcx_core::utils::naming;

use crate::capability::{RestCapabilities, RestfulController};
use crate::error::RouteResult;
use crate::routing;

/// 控制器登记信息
#[derive(Debug, Clone, Copy)]
pub struct ControllerRegistration {
    /// 控制器类型名称
    pub type_name: &'static str,

    pub type_id: fn() -> TypeId,

    /// 声明控制器的模块路径
    pub origin: &'static str,

    pub capabilities: RestCapabilities,

    /// 创建新实例
    pub create: fn() -> ServiceInstance,
}

impl ControllerRegistration {
    /// 以控制器类型构造登记信息，来源为类型所在的模块
    pub fn of<C: RestfulController + Default>() -> Self {
        let type_name = type_name::<C>();
        let origin = type_name
            .split('<')
            .next()
            .and_then(|base| base.rfind("::").map(|index| &type_name[..index]))
            .unwrap_or("");

        Self {
            type_name,
            type_id: TypeId::of::<C>,
            origin,
            capabilities: C::CAPABILITIES,
            create: create_controller::<C>,
        }
    }

    /// 不含模块路径的类型名
    pub fn short_name(&self) -> &'static str {
        naming::short_type_name(self.type_name)
    }

    /// 容器中的服务名：`ProductsController` → `productsController`
    pub fn service_name(&self) -> String {
        naming::to_camel_case(self.short_name())
    }

    /// 路由中的控制器名：`ProductsController` → `Products`
    pub fn controller_name(&self) -> RouteResult<String> {
        routing::controller_name(self.type_name)
    }

    /// 是否来自给定的 crate 或模块
    pub fn is_from(&self, origin: &str) -> bool {
        self.origin == origin
            || self
                .origin
                .strip_prefix(origin)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// 控制器的默认构造函数
pub fn create_controller<C: Default + Any + Send + Sync>() -> ServiceInstance {
    Box::new(C::default())
}

inventory::collect!(ControllerRegistration);

/// 登记控制器
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct ProductsController;
///
/// impl RestfulController for ProductsController {
///     const CAPABILITIES: RestCapabilities = RestCapabilities::all();
/// }
///
/// mvcx_web::register_controller!(ProductsController);
/// ```
#[macro_export]
macro_rules! register_controller {
    ($controller:ty) => {
        $crate::inventory::submit! {
            $crate::controller::ControllerRegistration {
                type_name: concat!(module_path!(), "::", stringify!($controller)),
                type_id: ::std::any::TypeId::of::<$controller>,
                origin: module_path!(),
                capabilities: <$controller as $crate::capability::RestfulController>::CAPABILITIES,
                create: $crate::controller::create_controller::<$controller>,
            }
        }
    };
}

/// 控制器目录（已知的具体控制器类型）
#[derive(Debug, Clone, Default)]
pub struct ControllerCatalog {
    registrations: Vec<ControllerRegistration>,
}

impl ControllerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 收集所有通过 `register_controller!` 登记的控制器，按类型名排序
    pub fn discover() -> Self {
        tracing::info!("Discovering controllers from inventory...");

        let mut registrations: Vec<_> = inventory::iter::<ControllerRegistration>
            .into_iter()
            .copied()
            .collect();
        registrations.sort_by_key(|registration| registration.type_name);

        tracing::info!("Controller discovery completed: {} controller(s)", registrations.len());
        Self { registrations }
    }

    pub fn from_registrations(registrations: impl IntoIterator<Item = ControllerRegistration>) -> Self {
        Self {
            registrations: registrations.into_iter().collect(),
        }
    }

    /// 追加控制器
    pub fn with<C: RestfulController + Default>(mut self) -> Self {
        self.registrations.push(ControllerRegistration::of::<C>());
        self
    }

    pub fn registrations(&self) -> &[ControllerRegistration] {
        &self.registrations
    }

    pub fn find(&self, type_id: TypeId) -> Option<&ControllerRegistration> {
        self.registrations
            .iter()
            .find(|registration| (registration.type_id)() == type_id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct OrdersController {
        created: bool,
    }

    impl RestfulController for OrdersController {
        const CAPABILITIES: RestCapabilities = RestCapabilities::CREATE;
    }

    #[derive(Default)]
    struct InventoryController;

    impl RestfulController for InventoryController {
        const CAPABILITIES: RestCapabilities = RestCapabilities::LIST;
    }

    crate::register_controller!(InventoryController);

    #[test]
    fn test_registration_of_type() {
        let registration = ControllerRegistration::of::<OrdersController>();

        assert_eq!(registration.short_name(), "OrdersController");
        assert_eq!(registration.service_name(), "ordersController");
        assert_eq!(registration.controller_name().unwrap(), "Orders");
        assert_eq!(registration.origin, "mvcx_web::controller::tests");
        assert_eq!((registration.type_id)(), TypeId::of::<OrdersController>());

        let instance = (registration.create)();
        assert!(!instance.downcast_ref::<OrdersController>().unwrap().created);
    }

    #[test]
    fn test_origin_matches_crate_and_module_prefixes() {
        let registration = ControllerRegistration::of::<OrdersController>();

        assert!(registration.is_from("mvcx_web"));
        assert!(registration.is_from("mvcx_web::controller"));
        assert!(registration.is_from("mvcx_web::controller::tests"));
        assert!(!registration.is_from("mvcx"));
        assert!(!registration.is_from("app"));
    }

    #[test]
    fn test_discover_finds_submitted_controllers() {
        let catalog = ControllerCatalog::discover();

        let registration = catalog.find(TypeId::of::<InventoryController>()).unwrap();
        assert_eq!(registration.type_name, "mvcx_web::controller::tests::InventoryController");
        assert_eq!(registration.capabilities, RestCapabilities::LIST);
        assert!((registration.create)().is::<InventoryController>());
    }

    #[test]
    fn test_catalog_builder() {
        let catalog = ControllerCatalog::new()
            .with::<OrdersController>()
            .with::<InventoryController>();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.find(TypeId::of::<OrdersController>()).is_some());
        assert!(catalog.find(TypeId::of::<String>()).is_none());
    }
}

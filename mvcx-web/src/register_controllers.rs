//! 启动任务：把控制器注册为瞬态服务

use std::any::type_name;
use std::collections::HashSet;
use std::sync::Arc;

use mvcx_core::prelude::*;
use mvcx_core::service::{ErasedFactory, ServiceDefinition};

use crate::constants::{
    CONTROLLERS_EXCLUDED, CONTROLLERS_EXCLUDED_ORIGINS, CONTROLLERS_IGNORED,
    DEFAULT_EXCLUDED_ORIGINS,
};
use crate::controller::{ControllerCatalog, ControllerRegistration};

/// 控制器注册配置
///
/// 只作用于一次启动，不存在进程级的可变状态。
#[derive(Debug, Clone)]
pub struct RegisterControllersSettings {
    /// 跳过整个任务
    pub excluded: bool,

    /// 忽略的控制器（完整类型名或短类型名）
    pub ignored_types: HashSet<String>,

    /// 忽略的来源（crate 或模块路径）
    pub excluded_origins: Vec<String>,
}

impl Default for RegisterControllersSettings {
    fn default() -> Self {
        Self {
            excluded: false,
            ignored_types: HashSet::new(),
            excluded_origins: DEFAULT_EXCLUDED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegisterControllersSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 Environment 读取
    ///
    /// - `mvcx.controllers.excluded`
    /// - `mvcx.controllers.ignored`
    /// - `mvcx.controllers.excluded-origins`
    pub fn from_environment(env: &Environment) -> Self {
        let defaults = Self::default();
        Self {
            excluded: env.get_bool_or(CONTROLLERS_EXCLUDED, defaults.excluded),
            ignored_types: env
                .get_string_array(CONTROLLERS_IGNORED)
                .map(|types| types.into_iter().collect())
                .unwrap_or(defaults.ignored_types),
            excluded_origins: env
                .get_string_array(CONTROLLERS_EXCLUDED_ORIGINS)
                .unwrap_or(defaults.excluded_origins),
        }
    }

    pub fn excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    /// 忽略控制器 `C`
    pub fn ignore<C: 'static>(self) -> Self {
        self.ignore_type(type_name::<C>())
    }

    pub fn ignore_type(mut self, type_name: impl Into<String>) -> Self {
        self.ignored_types.insert(type_name.into());
        self
    }

    pub fn exclude_origin(mut self, origin: impl Into<String>) -> Self {
        self.excluded_origins.push(origin.into());
        self
    }

    /// 控制器是否应该注册
    pub fn accepts(&self, registration: &ControllerRegistration) -> bool {
        if self
            .excluded_origins
            .iter()
            .any(|origin| registration.is_from(origin))
        {
            return false;
        }

        !(self.ignored_types.contains(registration.type_name)
            || self.ignored_types.contains(registration.short_name()))
    }
}

/// 注册控制器
///
/// 从容器解析 [`ControllerCatalog`]，过滤后把每个控制器注册为瞬态服务，
/// 服务名为驼峰形式的短类型名（`ProductsController` → `productsController`）。
pub struct RegisterControllers {
    container: Arc<dyn ContainerAdapter>,
    settings: RegisterControllersSettings,
}

impl RegisterControllers {
    pub fn new(container: Arc<dyn ContainerAdapter>) -> Self {
        Self::with_settings(container, RegisterControllersSettings::default())
    }

    pub fn with_settings(container: Arc<dyn ContainerAdapter>, settings: RegisterControllersSettings) -> Self {
        Self { container, settings }
    }

    pub fn settings(&self) -> &RegisterControllersSettings {
        &self.settings
    }
}

impl BootstrapperTask for RegisterControllers {
    fn name(&self) -> &str {
        "RegisterControllers"
    }

    fn execute(&self) -> Result<TaskContinuation> {
        if self.settings.excluded {
            tracing::debug!("Controller registration excluded by configuration");
            return Ok(TaskContinuation::Continue);
        }

        let catalog = self
            .container
            .get_instance::<ControllerCatalog>()
            .context("Controller catalog is not registered")?;

        let mut registered = 0;
        for registration in catalog.registrations() {
            if !self.settings.accepts(registration) {
                tracing::debug!("Skipping controller: {}", registration.type_name);
                continue;
            }

            let factory = ErasedFactory::new(
                registration.type_id,
                registration.type_name,
                registration.create,
            );
            let definition = ServiceDefinition::new(registration.service_name(), factory)
                .with_lifetime(Lifetime::Transient);
            self.container.register(definition)?;

            tracing::debug!(
                "Registered controller '{}' as '{}'",
                registration.type_name,
                registration.service_name()
            );
            registered += 1;
        }

        tracing::info!("Registered {} controller(s)", registered);
        Ok(TaskContinuation::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{RestCapabilities, RestfulController};
    use crate::constants::CONTROLLER_CATALOG;
    use mvcx_core::config::MapPropertySource;

    #[derive(Default)]
    struct ProductsController;

    impl RestfulController for ProductsController {
        const CAPABILITIES: RestCapabilities = RestCapabilities::all();
    }

    #[derive(Default)]
    struct AuditController;

    impl RestfulController for AuditController {
        const CAPABILITIES: RestCapabilities = RestCapabilities::LIST;
    }

    /// 模拟应用 crate 中登记的控制器
    fn app_controller<C: RestfulController + Default>() -> ControllerRegistration {
        ControllerRegistration {
            origin: "app::controllers",
            ..ControllerRegistration::of::<C>()
        }
    }

    fn container_with(catalog: ControllerCatalog) -> Arc<ServiceContainer> {
        let container = Arc::new(ServiceContainer::new());
        container
            .register_instance(CONTROLLER_CATALOG, Arc::new(catalog))
            .unwrap();
        container
    }

    #[test]
    fn test_registers_controllers_as_transient() {
        let container = container_with(ControllerCatalog::from_registrations(vec![
            app_controller::<ProductsController>(),
        ]));

        let task = RegisterControllers::new(container.clone());
        assert_eq!(task.execute().unwrap(), TaskContinuation::Continue);

        let first = container.resolve_as::<ProductsController>("productsController").unwrap();
        let second = container.get_instance::<ProductsController>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_settings_skip_framework_origin() {
        let catalog = ControllerCatalog::from_registrations(vec![
            app_controller::<ProductsController>(),
            ControllerRegistration::of::<AuditController>(),
        ]);
        let container = container_with(catalog);

        RegisterControllers::new(container.clone()).execute().unwrap();

        assert!(container.contains("productsController"));
        assert!(!container.contains("auditController"));
    }

    #[test]
    fn test_ignored_types_are_skipped() {
        let settings = RegisterControllersSettings::new().ignore::<AuditController>();

        assert!(settings.accepts(&app_controller::<ProductsController>()));
        assert!(!settings.accepts(&app_controller::<AuditController>()));

        let by_short_name = RegisterControllersSettings::new().ignore_type("ProductsController");
        assert!(!by_short_name.accepts(&app_controller::<ProductsController>()));
    }

    #[test]
    fn test_extra_excluded_origin() {
        let settings = RegisterControllersSettings::new().exclude_origin("app");

        assert!(!settings.accepts(&app_controller::<ProductsController>()));
    }

    #[test]
    fn test_excluded_task_registers_nothing() {
        let container = Arc::new(ServiceContainer::new());

        let task = RegisterControllers::with_settings(
            container.clone(),
            RegisterControllersSettings::new().excluded(true),
        );

        assert_eq!(task.execute().unwrap(), TaskContinuation::Continue);
        assert!(container.service_names().is_empty());
    }

    #[test]
    fn test_missing_catalog_is_error() {
        let task = RegisterControllers::new(Arc::new(ServiceContainer::new()));
        let error = task.execute().unwrap_err();

        assert!(error.to_string().contains("Controller catalog"));
    }

    #[test]
    fn test_settings_from_environment() {
        let env = Environment::new().with_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property(CONTROLLERS_EXCLUDED, ConfigValue::Bool(true))
                .with_property(
                    CONTROLLERS_IGNORED,
                    ConfigValue::Array(vec![ConfigValue::String("AuditController".into())]),
                ),
        ));

        let settings = RegisterControllersSettings::from_environment(&env);

        assert!(settings.excluded);
        assert!(settings.ignored_types.contains("AuditController"));
        assert_eq!(settings.excluded_origins, vec!["mvcx_web"]);
    }
}

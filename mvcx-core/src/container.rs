use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Environment;
use crate::constants::ENVIRONMENT_SERVICE_NAME;
use crate::error::{ContainerError, ContainerResult};
use crate::service::{FunctionFactory, ServiceDefinition, ServiceFactory};
use crate::utils::naming;
use crate::Lifetime;

/// 容器中共享的服务引用
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// 容器适配器 trait - 宿主框架暴露的 register/resolve 接口
///
/// 只包含对象安全的方法；泛型的便捷方法在 [`ContainerAdapterExt`] 中。
pub trait ContainerAdapter: Send + Sync {
    /// 注册服务定义
    fn register(&self, definition: ServiceDefinition) -> ContainerResult<()>;

    /// 通过名称解析服务
    fn resolve(&self, name: &str) -> ContainerResult<SharedService>;

    /// 查找某个类型注册时使用的名称
    fn name_for_type(&self, type_id: TypeId) -> Option<String>;

    /// 检查是否包含指定名称的服务
    fn contains(&self, name: &str) -> bool;

    /// 获取所有服务的名称
    fn service_names(&self) -> Vec<String>;
}

/// [`ContainerAdapter`] 的泛型扩展
pub trait ContainerAdapterExt: ContainerAdapter {
    /// 注册瞬态服务
    fn register_transient<T, F>(&self, name: impl Into<String>, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        let definition = ServiceDefinition::new(name, FunctionFactory::new(factory))
            .with_lifetime(Lifetime::Transient);
        self.register(definition)
    }

    /// 注册单例服务
    fn register_singleton<T, F>(&self, name: impl Into<String>, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        let definition = ServiceDefinition::new(name, FunctionFactory::new(factory))
            .with_lifetime(Lifetime::Singleton);
        self.register(definition)
    }

    /// 注册已经创建好的共享实例
    ///
    /// 解析时返回 `Arc<T>` 的克隆，而不是 `T` 本身。
    fn register_instance<T>(&self, name: impl Into<String>, instance: Arc<T>) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
    {
        self.register_singleton(name, move || Ok(Arc::clone(&instance)))
    }

    /// 通过名称解析并向下转型
    fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let service = self.resolve(name)?;
        downcast_service::<T>(service)
    }

    /// 通过类型解析服务
    fn get_instance<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        let type_name = std::any::type_name::<T>();
        let name = self
            .name_for_type(TypeId::of::<T>())
            .or_else(|| self.name_for_type(TypeId::of::<Arc<T>>()))
            .ok_or_else(|| {
                ContainerError::ServiceNotFound(format!("No service found for type '{}'", type_name))
            })?;
        self.resolve_as::<T>(&name)
    }
}

impl<C: ContainerAdapter + ?Sized> ContainerAdapterExt for C {}

/// 向下转型。既支持以 `T` 注册的服务，也支持以 `Arc<T>` 注册的实例
fn downcast_service<T: Any + Send + Sync>(service: SharedService) -> ContainerResult<Arc<T>> {
    if let Some(shared) = service.downcast_ref::<Arc<T>>() {
        return Ok(Arc::clone(shared));
    }

    service
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            found: "unknown".to_string(),
        })
}

/// 默认的服务容器
///
/// 配置阶段注册，之后只读；单例在第一次解析时创建并缓存。
pub struct ServiceContainer {
    /// 服务定义存储
    definitions: RwLock<HashMap<String, Arc<ServiceDefinition>>>,

    /// 单例缓存
    singletons: RwLock<HashMap<String, SharedService>>,

    /// 类型到名称的映射
    type_to_name: RwLock<HashMap<TypeId, String>>,
}

impl ServiceContainer {
    /// 创建新的容器
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            singletons: RwLock::new(HashMap::new()),
            type_to_name: RwLock::new(HashMap::new()),
        }
    }

    /// 创建容器并把 Environment 注册为核心服务
    pub fn with_environment(environment: Arc<Environment>) -> ContainerResult<Self> {
        let container = Self::new();
        container.register_instance(ENVIRONMENT_SERVICE_NAME, environment)?;
        Ok(container)
    }

    /// 以类型名推导服务名注册瞬态服务
    ///
    /// `app::UserService` 注册为 `userService`
    pub fn register_transient_type<T, F>(&self, factory: F) -> ContainerResult<()>
    where
        T: Any + Send + Sync,
        F: Fn() -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.register_transient(default_service_name::<T>(), factory)
    }

    fn create_service(&self, definition: &ServiceDefinition) -> ContainerResult<SharedService> {
        let instance = definition.factory.create().map_err(|e| match e {
            ContainerError::CreationFailed(_) => e,
            other => ContainerError::CreationFailed(format!("{}: {}", definition.name, other)),
        })?;
        Ok(Arc::from(instance))
    }
}

/// 由类型名推导默认服务名
pub fn default_service_name<T: ?Sized>() -> String {
    naming::to_camel_case(naming::short_type_name(std::any::type_name::<T>()))
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerAdapter for ServiceContainer {
    fn register(&self, definition: ServiceDefinition) -> ContainerResult<()> {
        let name = definition.name.clone();
        let type_id = ServiceFactory::type_id(definition.factory.as_ref());

        tracing::trace!(
            "Attempting to register service: name='{}', type='{}', lifetime={:?}",
            name,
            definition.factory.type_name(),
            definition.lifetime
        );

        {
            let mut definitions = self.definitions.write();
            if definitions.contains_key(&name) {
                tracing::warn!("Service '{}' already exists, registration failed", name);
                return Err(ContainerError::ServiceAlreadyExists(name));
            }
            definitions.insert(name.clone(), Arc::new(definition));
        }

        self.type_to_name.write().insert(type_id, name.clone());

        tracing::debug!("Service definition registered successfully: '{}'", name);
        Ok(())
    }

    fn resolve(&self, name: &str) -> ContainerResult<SharedService> {
        let definition = self
            .definitions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!("Service '{}' not found in container", name);
                ContainerError::ServiceNotFound(name.to_string())
            })?;

        match definition.lifetime {
            Lifetime::Singleton => {
                if let Some(service) = self.singletons.read().get(name) {
                    return Ok(Arc::clone(service));
                }

                // 锁外创建，避免工厂内部再次解析时死锁
                let created = self.create_service(&definition)?;
                let mut singletons = self.singletons.write();
                let service = singletons
                    .entry(name.to_string())
                    .or_insert(created);

                tracing::debug!("Singleton service '{}' created and cached", name);
                Ok(Arc::clone(service))
            }
            Lifetime::Transient => {
                tracing::trace!("Creating new instance of transient service '{}'", name);
                self.create_service(&definition)
            }
        }
    }

    fn name_for_type(&self, type_id: TypeId) -> Option<String> {
        self.type_to_name.read().get(&type_id).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    fn service_names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }
}

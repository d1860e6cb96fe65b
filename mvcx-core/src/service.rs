use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use crate::{ContainerResult, Lifetime};

/// 容器中存放的服务实例
pub type ServiceInstance = Box<dyn Any + Send + Sync>;

/// 服务工厂 trait - 用于创建服务实例
pub trait ServiceFactory: Send + Sync {
    /// 创建服务实例
    fn create(&self) -> ContainerResult<ServiceInstance>;

    /// 获取服务的类型 ID
    fn type_id(&self) -> TypeId;

    /// 获取服务的类型名称
    fn type_name(&self) -> &str;
}

/// 服务定义 - 描述如何创建和管理服务
pub struct ServiceDefinition {
    /// 服务名称
    pub name: String,

    /// 生命周期
    pub lifetime: Lifetime,

    /// 服务工厂
    pub factory: Box<dyn ServiceFactory>,
}

impl ServiceDefinition {
    /// 创建新的服务定义（默认单例）
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: ServiceFactory + 'static,
    {
        Self {
            name: name.into(),
            lifetime: Lifetime::default(),
            factory: Box::new(factory),
        }
    }

    /// 设置生命周期
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("type_name", &self.factory.type_name())
            .finish()
    }
}

/// 简单的函数工厂实现
pub struct FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    factory_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> ServiceFactory for FunctionFactory<T, F>
where
    T: Any + Send + Sync,
    F: Fn() -> ContainerResult<T> + Send + Sync,
{
    fn create(&self) -> ContainerResult<ServiceInstance> {
        let instance = (self.factory_fn)()?;
        Ok(Box::new(instance))
    }

    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }
}

/// 类型擦除后的工厂
///
/// 用于编译时登记的类型（只有 `fn` 指针和类型名称可用）
#[derive(Clone, Copy)]
pub struct ErasedFactory {
    type_id: fn() -> TypeId,
    type_name: &'static str,
    create: fn() -> ServiceInstance,
}

impl ErasedFactory {
    pub fn new(
        type_id: fn() -> TypeId,
        type_name: &'static str,
        create: fn() -> ServiceInstance,
    ) -> Self {
        Self {
            type_id,
            type_name,
            create,
        }
    }
}

impl ServiceFactory for ErasedFactory {
    fn create(&self) -> ContainerResult<ServiceInstance> {
        Ok((self.create)())
    }

    fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    fn type_name(&self) -> &str {
        self.type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter(&'static str);

    #[test]
    fn test_function_factory_reports_type() {
        let factory = FunctionFactory::new(|| Ok(Greeter("hi")));

        assert_eq!(ServiceFactory::type_id(&factory), TypeId::of::<Greeter>());
        assert!(factory.type_name().ends_with("Greeter"));

        let instance = factory.create().unwrap();
        assert_eq!(instance.downcast_ref::<Greeter>().unwrap().0, "hi");
    }

    #[test]
    fn test_erased_factory_creates_new_instances() {
        let factory = ErasedFactory::new(
            TypeId::of::<Greeter>,
            "Greeter",
            || Box::new(Greeter("erased")),
        );

        assert_eq!(ServiceFactory::type_id(&factory), TypeId::of::<Greeter>());
        assert_eq!(factory.type_name(), "Greeter");
        assert!(factory.create().unwrap().is::<Greeter>());
    }
}

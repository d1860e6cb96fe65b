//! 按模型类型登记属性元数据

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ValidationError, ValidationResult};
use crate::item::{ModelMetadataItem, ModelMetadataItemBuilder, ValueAccessor};
use crate::metadata::PropertyValue;

/// 模型 `M` 的元数据配置
///
/// ```rust,ignore
/// let mut config = ModelMetadataConfiguration::<User>::new();
/// config
///     .property("name", |user: &User| user.name.clone())?
///     .required()
///     .max_length(20)?;
/// registry.register(config)?;
/// ```
pub struct ModelMetadataConfiguration<M> {
    items: Vec<ModelMetadataItem>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Any> ModelMetadataConfiguration<M> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _model: PhantomData,
        }
    }

    /// 声明一个总是有值的属性
    pub fn property<V, F>(
        &mut self,
        name: &str,
        accessor: F,
    ) -> ValidationResult<ModelMetadataItemBuilder<'_, V>>
    where
        V: Any + Send + Sync,
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        self.optional_property(name, move |model: &M| Some(accessor(model)))
    }

    /// 声明一个可能缺失的属性（`None` 即“没有值”，必填规则会失败）
    pub fn optional_property<V, F>(
        &mut self,
        name: &str,
        accessor: F,
    ) -> ValidationResult<ModelMetadataItemBuilder<'_, V>>
    where
        V: Any + Send + Sync,
        F: Fn(&M) -> Option<V> + Send + Sync + 'static,
    {
        if name.trim().is_empty() {
            return Err(ValidationError::configuration(format!(
                "Property name must not be empty on {}",
                type_name::<M>()
            )));
        }
        if self.items.iter().any(|item| item.property_name() == name) {
            return Err(ValidationError::configuration(format!(
                "Property '{}' already configured on {}",
                name,
                type_name::<M>()
            )));
        }

        let accessor: ValueAccessor = Arc::new(move |container: &dyn Any| {
            container
                .downcast_ref::<M>()
                .and_then(|model| accessor(model))
                .map(|value| Arc::new(value) as PropertyValue)
        });

        let mut item = ModelMetadataItem::new(name);
        item.set_accessor(accessor);
        self.items.push(item);

        let index = self.items.len() - 1;
        Ok(ModelMetadataItemBuilder::new(&mut self.items[index]))
    }

    pub fn items(&self) -> &[ModelMetadataItem] {
        &self.items
    }
}

impl<M: Any> Default for ModelMetadataConfiguration<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// 元数据注册表
///
/// 启动阶段写入，之后并发只读。每个模型类型的属性保持声明顺序。
#[derive(Default)]
pub struct ModelMetadataRegistry {
    items: RwLock<HashMap<TypeId, Vec<Arc<ModelMetadataItem>>>>,
}

impl ModelMetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记模型 `M` 的全部属性元数据
    pub fn register<M: Any>(&self, configuration: ModelMetadataConfiguration<M>) -> ValidationResult<()> {
        let mut items = self.items.write();
        if items.contains_key(&TypeId::of::<M>()) {
            return Err(ValidationError::configuration(format!(
                "Metadata for {} already registered",
                type_name::<M>()
            )));
        }

        let count = configuration.items.len();
        items.insert(
            TypeId::of::<M>(),
            configuration.items.into_iter().map(Arc::new).collect(),
        );

        tracing::debug!("Registered metadata for {} ({} properties)", type_name::<M>(), count);
        Ok(())
    }

    /// 查找某个属性的元数据
    pub fn get(&self, container_type: TypeId, property_name: &str) -> Option<Arc<ModelMetadataItem>> {
        self.items
            .read()
            .get(&container_type)
            .and_then(|items| items.iter().find(|item| item.property_name() == property_name))
            .cloned()
    }

    /// 模型 `M` 的全部属性，按声明顺序
    pub fn items_for<M: Any>(&self) -> Vec<Arc<ModelMetadataItem>> {
        self.items
            .read()
            .get(&TypeId::of::<M>())
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains<M: Any>(&self) -> bool {
        self.items.read().contains_key(&TypeId::of::<M>())
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User {
        name: String,
        nickname: Option<String>,
    }

    #[test]
    fn test_register_and_lookup_keeps_declaration_order() {
        let mut config = ModelMetadataConfiguration::<User>::new();
        config
            .property("name", |user: &User| user.name.clone())
            .unwrap()
            .display_name("Name")
            .required();
        config
            .optional_property("nickname", |user: &User| user.nickname.clone())
            .unwrap();

        let registry = ModelMetadataRegistry::new();
        registry.register(config).unwrap();

        let names: Vec<_> = registry
            .items_for::<User>()
            .iter()
            .map(|item| item.property_name().to_string())
            .collect();
        assert_eq!(names, vec!["name", "nickname"]);

        let item = registry.get(TypeId::of::<User>(), "name").unwrap();
        assert_eq!(item.display_name(), Some("Name"));
        assert_eq!(item.validations().len(), 1);
        assert!(registry.get(TypeId::of::<User>(), "missing").is_none());
    }

    #[test]
    fn test_accessor_reads_property_value() {
        let mut config = ModelMetadataConfiguration::<User>::new();
        config.property("name", |user: &User| user.name.clone()).unwrap();
        config
            .optional_property("nickname", |user: &User| user.nickname.clone())
            .unwrap();

        let user = User {
            name: "alice".into(),
            nickname: None,
        };

        let name = config.items()[0].read_value(&user).unwrap();
        assert_eq!(name.downcast_ref::<String>().unwrap(), "alice");
        assert!(config.items()[1].read_value(&user).is_none());
        assert!(config.items()[0].read_value(&"not a user").is_none());
    }

    #[test]
    fn test_empty_or_duplicate_property_is_rejected() {
        let mut config = ModelMetadataConfiguration::<User>::new();
        assert!(matches!(
            config.property("  ", |user: &User| user.name.clone()),
            Err(ValidationError::Configuration(_))
        ));

        config.property("name", |user: &User| user.name.clone()).unwrap();
        assert!(matches!(
            config.property("name", |user: &User| user.name.clone()),
            Err(ValidationError::Configuration(_))
        ));
    }

    #[test]
    fn test_registering_same_model_twice_fails() {
        let registry = ModelMetadataRegistry::new();
        registry.register(ModelMetadataConfiguration::<User>::new()).unwrap();

        let result = registry.register(ModelMetadataConfiguration::<User>::new());
        assert!(matches!(result, Err(ValidationError::Configuration(_))));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains::<User>());
    }
}

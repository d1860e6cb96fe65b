//! 运行时的模型元数据
//!
//! 每次验证时为 (模型类型, 属性) 构造一份，携带当前属性值以及配置阶段
//! 登记的 [`ModelMetadataItem`]。

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::item::ModelMetadataItem;

/// 属性值（类型擦除）
pub type PropertyValue = Arc<dyn Any + Send + Sync>;

/// 模型元数据
#[derive(Clone)]
pub struct ModelMetadata {
    container_type: TypeId,
    container_type_name: &'static str,
    property_name: String,
    model: Option<PropertyValue>,
    item: Option<Arc<ModelMetadataItem>>,
}

impl ModelMetadata {
    /// 为模型 `M` 的某个属性创建元数据
    pub fn for_property<M: Any>(property_name: impl Into<String>) -> Self {
        Self {
            container_type: TypeId::of::<M>(),
            container_type_name: std::any::type_name::<M>(),
            property_name: property_name.into(),
            model: None,
            item: None,
        }
    }

    /// 从登记的元数据项和模型实例构造，属性值通过访问器读取
    pub fn from_item<M: Any>(item: Arc<ModelMetadataItem>, container: &M) -> Self {
        let model = item.read_value(container);
        Self {
            container_type: TypeId::of::<M>(),
            container_type_name: std::any::type_name::<M>(),
            property_name: item.property_name().to_string(),
            model,
            item: Some(item),
        }
    }

    /// 设置当前属性值
    pub fn with_model<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.model = Some(Arc::new(value));
        self
    }

    /// 附加元数据项
    pub fn with_item(mut self, item: Arc<ModelMetadataItem>) -> Self {
        self.item = Some(item);
        self
    }

    /// 重新设置属性值（同一份元数据验证多个取值时使用）
    pub fn set_model<V: Any + Send + Sync>(&mut self, value: V) {
        self.model = Some(Arc::new(value));
    }

    pub fn container_type(&self) -> TypeId {
        self.container_type
    }

    pub fn container_type_name(&self) -> &'static str {
        self.container_type_name
    }

    /// 描述运行时传入的模型实例
    ///
    /// `&dyn Any` 不带类型名，只有与元数据的容器类型一致时才能给出名称。
    pub fn describe_instance(&self, model: &dyn Any) -> String {
        let type_id = (*model).type_id();
        if type_id == self.container_type {
            self.container_type_name.to_string()
        } else {
            format!("{:?}", type_id)
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// 当前属性值
    pub fn model(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.model.as_deref()
    }

    pub fn item(&self) -> Option<&Arc<ModelMetadataItem>> {
        self.item.as_ref()
    }

    /// 显示名称：优先使用配置的显示名，否则使用属性名
    pub fn display_name(&self) -> &str {
        self.item
            .as_ref()
            .and_then(|item| item.display_name())
            .unwrap_or(self.property_name.as_str())
    }
}

impl fmt::Debug for ModelMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelMetadata")
            .field("container_type", &self.container_type_name)
            .field("property_name", &self.property_name)
            .field("has_model", &self.model.is_some())
            .field("has_item", &self.item.is_some())
            .finish()
    }
}

//! 验证器提供者
//!
//! [`CompositeValidatorProvider`] 依次询问上游提供者并拼接结果，
//! [`FluentValidatorProvider`] 把流式配置登记的规则集交给 [`ValidatorFactory`]。

use std::sync::Arc;

use crate::configuration::ModelMetadataRegistry;
use crate::error::ValidationResult;
use crate::metadata::ModelMetadata;
use crate::validator::{ModelValidator, ValidatorFactory};

/// 验证器提供者
pub trait ModelValidatorProvider: Send + Sync {
    /// 返回适用于该属性的验证器
    ///
    /// `providers` 是完整的提供者列表，供需要递归查询的验证器使用。
    fn get_validators(
        &self,
        metadata: &ModelMetadata,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> ValidationResult<Vec<Arc<dyn ModelValidator>>>;
}

/// 组合提供者
///
/// 提供者列表在构造时固定。结果按提供者顺序拼接，不去重；
/// 任一提供者失败时错误原样返回，不吞掉也不记录。
#[derive(Clone)]
pub struct CompositeValidatorProvider {
    providers: Vec<Arc<dyn ModelValidatorProvider>>,
}

impl CompositeValidatorProvider {
    pub fn new(providers: Vec<Arc<dyn ModelValidatorProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn ModelValidatorProvider>] {
        &self.providers
    }
}

impl ModelValidatorProvider for CompositeValidatorProvider {
    fn get_validators(
        &self,
        metadata: &ModelMetadata,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> ValidationResult<Vec<Arc<dyn ModelValidator>>> {
        let mut validators = Vec::new();
        for provider in &self.providers {
            validators.extend(provider.get_validators(metadata, providers)?);
        }
        Ok(validators)
    }
}

/// 基于流式配置的提供者
///
/// 优先使用元数据上附带的元数据项，否则按 (模型类型, 属性) 查注册表。
/// 没有登记规则的属性不产生验证器。
pub struct FluentValidatorProvider {
    registry: Arc<ModelMetadataRegistry>,
}

impl FluentValidatorProvider {
    pub fn new(registry: Arc<ModelMetadataRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelMetadataRegistry> {
        &self.registry
    }
}

impl ModelValidatorProvider for FluentValidatorProvider {
    fn get_validators(
        &self,
        metadata: &ModelMetadata,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> ValidationResult<Vec<Arc<dyn ModelValidator>>> {
        let item = match metadata.item() {
            Some(item) => Some(Arc::clone(item)),
            None => self
                .registry
                .get(metadata.container_type(), metadata.property_name()),
        };

        match item {
            Some(item) if !item.validations().is_empty() => {
                let validator: Arc<dyn ModelValidator> =
                    ValidatorFactory::create_validator(item.validations(), providers);
                Ok(vec![validator])
            }
            _ => Ok(Vec::new()),
        }
    }
}

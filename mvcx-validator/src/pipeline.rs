use std::any::{type_name, Any};
use std::sync::Arc;

use crate::configuration::ModelMetadataRegistry;
use crate::error::{ValidationError, ValidationResult};
use crate::metadata::ModelMetadata;
use crate::provider::{CompositeValidatorProvider, ModelValidatorProvider};
use crate::validator::ModelValidationResult;

/// 模型验证管道
///
/// 为模型的每个登记属性构造元数据，通过组合提供者取得验证器并执行。
/// 结果按属性声明顺序、再按验证器顺序排列。
pub struct ModelValidationPipeline {
    registry: Arc<ModelMetadataRegistry>,
    provider: Arc<CompositeValidatorProvider>,
}

impl ModelValidationPipeline {
    pub fn new(registry: Arc<ModelMetadataRegistry>, provider: Arc<CompositeValidatorProvider>) -> Self {
        Self { registry, provider }
    }

    pub fn provider(&self) -> &Arc<CompositeValidatorProvider> {
        &self.provider
    }

    /// 验证模型，返回全部失败
    pub fn validate<M: Any>(&self, model: &M) -> ValidationResult<Vec<ModelValidationResult>> {
        let providers = self.provider.providers();
        let mut results = Vec::new();

        for item in self.registry.items_for::<M>() {
            let metadata = ModelMetadata::from_item(item, model);
            for validator in self.provider.get_validators(&metadata, providers)? {
                results.extend(validator.validate(&metadata, model)?);
            }
        }

        tracing::debug!(
            "Validated {}: {} failure(s)",
            type_name::<M>(),
            results.len()
        );
        Ok(results)
    }

    /// 验证模型，有失败时返回 [`ValidationError::FieldErrors`]
    pub fn validate_model<M: Any>(&self, model: &M) -> ValidationResult<()> {
        match into_field_errors(self.validate(model)?) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// 把验证结果折叠为按属性分组的字段错误；没有结果时返回 `None`
pub fn into_field_errors(results: Vec<ModelValidationResult>) -> Option<ValidationError> {
    let mut results = results.into_iter();
    let first = results.next()?;

    let mut error = ValidationError::field_error(first.member_name, first.message);
    for result in results {
        error.add_field_error(result.member_name, result.message);
    }
    Some(error)
}

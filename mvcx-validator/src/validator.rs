use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ValidationResult;
use crate::metadata::ModelMetadata;
use crate::provider::ModelValidatorProvider;
use crate::rule::ValidationRuleSet;

/// 单条验证失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelValidationResult {
    /// 失败的属性
    pub member_name: String,
    pub message: String,
}

impl ModelValidationResult {
    pub fn new(member_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            member_name: member_name.into(),
            message: message.into(),
        }
    }
}

/// 验证器 trait
///
/// 对运行时的模型实例求值，返回全部失败；没有失败时返回空列表。
pub trait ModelValidator: Send + Sync {
    fn validate(
        &self,
        metadata: &ModelMetadata,
        model: &dyn Any,
    ) -> ValidationResult<Vec<ModelValidationResult>>;
}

/// 基于规则集的验证器
///
/// 持有规则集的快照和创建时的提供者列表；求值时提供者列表会交给每条规则，
/// 规则可以借此为嵌套模型递归获取验证器。
#[derive(Clone)]
pub struct DelegateBasedValidator {
    rules: ValidationRuleSet,
    providers: Vec<Arc<dyn ModelValidatorProvider>>,
}

impl DelegateBasedValidator {
    pub fn rules(&self) -> &ValidationRuleSet {
        &self.rules
    }

    /// 创建时绑定的提供者列表
    pub fn providers(&self) -> &[Arc<dyn ModelValidatorProvider>] {
        &self.providers
    }
}

impl ModelValidator for DelegateBasedValidator {
    fn validate(
        &self,
        metadata: &ModelMetadata,
        model: &dyn Any,
    ) -> ValidationResult<Vec<ModelValidationResult>> {
        let failures = self.rules.evaluate_with(metadata, model, &self.providers)?;

        Ok(failures
            .into_iter()
            .map(|failure| ModelValidationResult::new(metadata.property_name(), failure.message))
            .collect())
    }
}

impl fmt::Debug for DelegateBasedValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateBasedValidator")
            .field("rules", &self.rules)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// 验证器工厂
pub struct ValidatorFactory;

impl ValidatorFactory {
    /// 为规则集创建验证器
    ///
    /// 空规则集同样返回一个验证器，它总是报告零个失败。
    pub fn create_validator(
        rules: &ValidationRuleSet,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> Arc<DelegateBasedValidator> {
        Arc::new(DelegateBasedValidator {
            rules: rules.clone(),
            providers: providers.to_vec(),
        })
    }
}

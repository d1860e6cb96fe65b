//! mvcx-validator - 流式模型元数据与组合验证
//!
//! 启动阶段通过 [`ModelMetadataConfiguration`] 为模型属性声明显示信息和验证规则，
//! 登记到 [`ModelMetadataRegistry`]；请求阶段由 [`CompositeValidatorProvider`]
//! 汇总各个上游提供者的验证器，按顺序执行并收集失败消息。

pub mod configuration;
pub mod error;
pub mod item;
pub mod metadata;
pub mod pipeline;
pub mod provider;
pub mod rule;
pub mod rules;
pub mod task;
pub mod validator;

pub use configuration::{ModelMetadataConfiguration, ModelMetadataRegistry};
pub use error::{ValidationError, ValidationResult};
pub use item::{ModelMetadataItem, ModelMetadataItemBuilder, ValueAccessor};
pub use metadata::{ModelMetadata, PropertyValue};
pub use pipeline::{into_field_errors, ModelValidationPipeline};
pub use provider::{CompositeValidatorProvider, FluentValidatorProvider, ModelValidatorProvider};
pub use rule::{MessageSource, RuleFailure, ValidationRule, ValidationRuleSet};
pub use rules::{ValidationRules, EMAIL_PATTERN};
pub use task::{
    RegisterValidation, MODEL_METADATA_REGISTRY, MODEL_VALIDATION_PIPELINE, MODEL_VALIDATOR_PROVIDER,
};
pub use validator::{
    DelegateBasedValidator, ModelValidationResult, ModelValidator, ValidatorFactory,
};

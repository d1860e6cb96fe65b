use std::collections::HashMap;
use thiserror::Error;

/// 验证错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 配置阶段的错误用法（非法正则、min > max、重复属性等），在启动时立即失败
    #[error("Invalid validation configuration: {0}")]
    Configuration(String),

    /// 模型实例与规则声明的类型不一致，不能当作“验证通过”处理
    #[error("Type mismatch: rule expects model of type {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// 上游验证器提供者失败，原样向上传递
    #[error("Validator provider failed: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Field validation errors")]
    FieldErrors(HashMap<String, Vec<String>>),
}

impl ValidationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::FieldErrors(errors)
    }

    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        if let Self::FieldErrors(errors) = self {
            errors.entry(field.into()).or_default().push(message.into());
        }
    }

    /// 字段错误（仅 `FieldErrors` 有值）
    pub fn field_errors(&self) -> Option<&HashMap<String, Vec<String>>> {
        match self {
            Self::FieldErrors(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

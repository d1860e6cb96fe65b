use std::any::Any;
use std::fmt::Display;

use regex::Regex;

use crate::error::{ValidationError, ValidationResult};
use crate::metadata::ModelMetadata;
use crate::rule::{MessageSource, ValidationRule};

/// 邮箱格式
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// 内置验证规则
///
/// 每个方法构造一条 [`ValidationRule`]；未指定消息时使用以显示名称格式化的默认消息。
pub struct ValidationRules;

impl ValidationRules {
    /// 必填：属性值存在，且字符串不能为空白
    pub fn required(custom_message: Option<MessageSource>) -> ValidationRule {
        let message = custom_message
            .unwrap_or_else(|| MessageSource::formatted(|field| format!("{} is required.", field)));

        ValidationRule::new(
            "required",
            |metadata: &ModelMetadata, _model: &dyn Any| {
                Ok(match metadata.model() {
                    None => false,
                    Some(value) => match value.downcast_ref::<String>() {
                        Some(text) => !text.trim().is_empty(),
                        None => true,
                    },
                })
            },
            message,
        )
    }

    /// 字符串长度（按字符计）
    pub fn length(
        min: Option<usize>,
        max: Option<usize>,
        custom_message: Option<MessageSource>,
    ) -> ValidationResult<ValidationRule> {
        if let (Some(min_len), Some(max_len)) = (min, max) {
            if min_len > max_len {
                return Err(ValidationError::configuration(format!(
                    "length: min ({}) must not exceed max ({})",
                    min_len, max_len
                )));
            }
        }

        let message = custom_message.unwrap_or_else(|| {
            MessageSource::formatted(move |field| match (min, max) {
                (Some(min_len), Some(max_len)) => format!(
                    "{} length must be between {} and {}.",
                    field, min_len, max_len
                ),
                (Some(min_len), None) => format!("{} length must be at least {}.", field, min_len),
                (None, Some(max_len)) => format!("{} length must be at most {}.", field, max_len),
                (None, None) => format!("{} has an invalid length.", field),
            })
        });

        Ok(ValidationRule::for_value(
            "length",
            move |value: &String| {
                let len = value.chars().count();
                min.map_or(true, |min_len| len >= min_len) && max.map_or(true, |max_len| len <= max_len)
            },
            message,
        ))
    }

    /// 数值范围（闭区间）
    pub fn range<T>(min: T, max: T, custom_message: Option<MessageSource>) -> ValidationResult<ValidationRule>
    where
        T: PartialOrd + Display + Any + Send + Sync,
    {
        if min > max {
            return Err(ValidationError::configuration(format!(
                "range: min ({}) must not exceed max ({})",
                min, max
            )));
        }

        let message = match custom_message {
            Some(message) => message,
            None => {
                let (min_text, max_text) = (min.to_string(), max.to_string());
                MessageSource::formatted(move |field| {
                    format!("{} must be between {} and {}.", field, min_text, max_text)
                })
            }
        };

        Ok(ValidationRule::for_value(
            "range",
            move |value: &T| *value >= min && *value <= max,
            message,
        ))
    }

    /// 正则匹配，非法的正则在配置阶段即报错
    pub fn pattern(pattern: &str, custom_message: Option<MessageSource>) -> ValidationResult<ValidationRule> {
        let message = custom_message.unwrap_or_else(|| {
            let pattern = pattern.to_string();
            MessageSource::formatted(move |field| format!("{} must match pattern: {}", field, pattern))
        });
        Self::regex_rule("pattern", pattern, message)
    }

    /// 邮箱格式
    pub fn email(custom_message: Option<MessageSource>) -> ValidationResult<ValidationRule> {
        let message = custom_message.unwrap_or_else(|| {
            MessageSource::formatted(|field| format!("{} must be a valid email address.", field))
        });
        Self::regex_rule("email", EMAIL_PATTERN, message)
    }

    fn regex_rule(name: &str, pattern: &str, message: MessageSource) -> ValidationResult<ValidationRule> {
        let regex = Regex::new(pattern).map_err(|e| {
            ValidationError::configuration(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        Ok(ValidationRule::for_value(
            name,
            move |value: &String| regex.is_match(value),
            message,
        ))
    }
}

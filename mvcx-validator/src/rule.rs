//! 验证规则与规则集
//!
//! 一条 [`ValidationRule`] 由一个谓词和一个延迟求值的错误消息组成；
//! [`ValidationRuleSet`] 按声明顺序保存同一属性上的全部规则。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{ValidationError, ValidationResult};
use crate::metadata::ModelMetadata;
use crate::provider::ModelValidatorProvider;

/// 谓词：接收运行时元数据（含属性值）、容器模型实例，以及验证器创建时绑定的提供者列表
pub type RulePredicate = Arc<
    dyn Fn(&ModelMetadata, &dyn Any, &[Arc<dyn ModelValidatorProvider>]) -> ValidationResult<bool>
        + Send
        + Sync,
>;

/// 错误消息来源
///
/// 只有在谓词失败时才会求值，因此闭包可以读取声明之后才变化的外部状态。
#[derive(Clone)]
pub enum MessageSource {
    /// 固定消息
    Static(String),

    /// 延迟求值的消息
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),

    /// 以显示名称格式化的消息（内置规则的默认消息）
    Formatted(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl MessageSource {
    pub fn lazy<F>(message: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(message))
    }

    pub fn formatted<F>(message: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Formatted(Arc::new(message))
    }

    /// 委托规则的默认消息
    pub fn invalid() -> Self {
        Self::formatted(|name| format!("{} is invalid.", name))
    }

    /// 求值
    pub fn resolve(&self, display_name: &str) -> String {
        match self {
            Self::Static(message) => message.clone(),
            Self::Lazy(message) => message(),
            Self::Formatted(message) => message(display_name),
        }
    }
}

impl From<&str> for MessageSource {
    fn from(message: &str) -> Self {
        Self::Static(message.to_string())
    }
}

impl From<String> for MessageSource {
    fn from(message: String) -> Self {
        Self::Static(message)
    }
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(message) => f.debug_tuple("Static").field(message).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::Formatted(_) => f.write_str("Formatted(..)"),
        }
    }
}

/// 单条验证规则，构造后不可变
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    predicate: RulePredicate,
    message: MessageSource,
}

impl ValidationRule {
    /// 使用原始谓词创建规则
    pub fn new<F>(name: impl Into<String>, predicate: F, message: MessageSource) -> Self
    where
        F: Fn(&ModelMetadata, &dyn Any) -> ValidationResult<bool> + Send + Sync + 'static,
    {
        Self::with_providers(name, move |metadata, model, _| predicate(metadata, model), message)
    }

    /// 需要提供者列表的规则，例如递归验证嵌套模型
    pub fn with_providers<F>(name: impl Into<String>, predicate: F, message: MessageSource) -> Self
    where
        F: Fn(&ModelMetadata, &dyn Any, &[Arc<dyn ModelValidatorProvider>]) -> ValidationResult<bool>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            message,
        }
    }

    /// 基于模型 `M` 的委托规则
    ///
    /// 运行时传入的模型不是 `M` 时返回 [`ValidationError::TypeMismatch`]。
    pub fn delegate<M, F>(predicate: F, message: MessageSource) -> Self
    where
        M: Any,
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        Self::new(
            "delegate",
            move |metadata: &ModelMetadata, model: &dyn Any| {
                let model = model.downcast_ref::<M>().ok_or_else(|| {
                    ValidationError::type_mismatch(
                        std::any::type_name::<M>(),
                        metadata.describe_instance(model),
                    )
                })?;
                Ok(predicate(model))
            },
            message,
        )
    }

    /// 基于属性值 `V` 的规则，属性值缺失时视为通过
    pub fn for_value<V, F>(name: impl Into<String>, predicate: F, message: MessageSource) -> Self
    where
        V: Any,
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        Self::new(
            name,
            move |metadata: &ModelMetadata, _model: &dyn Any| match metadata.model() {
                None => Ok(true),
                Some(value) => value
                    .downcast_ref::<V>()
                    .map(&predicate)
                    .ok_or_else(|| {
                        ValidationError::type_mismatch(
                            std::any::type_name::<V>(),
                            format!("value of property '{}'", metadata.property_name()),
                        )
                    }),
            },
            message,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 谓词是否成立（不带提供者）
    pub fn is_satisfied(&self, metadata: &ModelMetadata, model: &dyn Any) -> ValidationResult<bool> {
        self.is_satisfied_with(metadata, model, &[])
    }

    pub fn is_satisfied_with(
        &self,
        metadata: &ModelMetadata,
        model: &dyn Any,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> ValidationResult<bool> {
        (self.predicate)(metadata, model, providers)
    }

    /// 求值错误消息
    pub fn message(&self, display_name: &str) -> String {
        self.message.resolve(display_name)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish()
    }
}

/// 单条规则失败记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule: String,
    pub message: String,
}

/// 规则集：插入顺序即执行和报告顺序
#[derive(Debug, Clone, Default)]
pub struct ValidationRuleSet {
    rules: Vec<ValidationRule>,
}

impl ValidationRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加规则（不去重）
    pub fn add(&mut self, rule: ValidationRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationRule> {
        self.rules.iter()
    }

    /// 依次执行所有规则
    ///
    /// 每条失败的规则产生一条记录，不会提前结束；消息在此时才求值。
    pub fn evaluate(
        &self,
        metadata: &ModelMetadata,
        model: &dyn Any,
    ) -> ValidationResult<Vec<RuleFailure>> {
        self.evaluate_with(metadata, model, &[])
    }

    /// 同 [`evaluate`](Self::evaluate)，并把提供者列表交给每条规则
    pub fn evaluate_with(
        &self,
        metadata: &ModelMetadata,
        model: &dyn Any,
        providers: &[Arc<dyn ModelValidatorProvider>],
    ) -> ValidationResult<Vec<RuleFailure>> {
        let display_name = metadata.display_name();
        let mut failures = Vec::new();

        for rule in &self.rules {
            if !rule.is_satisfied_with(metadata, model, providers)? {
                tracing::trace!(
                    "Rule '{}' failed for property '{}'",
                    rule.name(),
                    metadata.property_name()
                );
                failures.push(RuleFailure {
                    rule: rule.name().to_string(),
                    message: rule.message(display_name),
                });
            }
        }

        Ok(failures)
    }
}

impl<'a> IntoIterator for &'a ValidationRuleSet {
    type Item = &'a ValidationRule;
    type IntoIter = std::slice::Iter<'a, ValidationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Order {
        quantity: u32,
    }

    struct Invoice;

    fn metadata() -> ModelMetadata {
        ModelMetadata::for_property::<Order>("quantity")
    }

    #[test]
    fn test_all_failing_rules_reported_in_order_without_dedup() {
        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity > 10, "too small".into()));
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity > 10, "too small".into()));
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity > 0, "zero".into()));

        let failures = rules.evaluate(&metadata(), &Order { quantity: 5 }).unwrap();

        let messages: Vec<_> = failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["too small", "too small"]);
    }

    #[test]
    fn test_failures_keep_declaration_order() {
        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity != 1, "first".into()));
        rules.add(ValidationRule::delegate(|_: &Order| true, "never".into()));
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity > 100, "third".into()));

        let failures = rules.evaluate(&metadata(), &Order { quantity: 1 }).unwrap();

        assert_eq!(
            failures,
            vec![
                RuleFailure { rule: "delegate".into(), message: "first".into() },
                RuleFailure { rule: "delegate".into(), message: "third".into() },
            ]
        );
    }

    #[test]
    fn test_lazy_message_reads_current_state() {
        let locale = Arc::new(Mutex::new("en".to_string()));
        let locale_clone = Arc::clone(&locale);

        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::delegate(
            |o: &Order| o.quantity > 0,
            MessageSource::lazy(move || format!("invalid ({})", locale_clone.lock())),
        ));

        *locale.lock() = "fr".to_string();
        let failures = rules.evaluate(&metadata(), &Order { quantity: 0 }).unwrap();

        assert_eq!(failures[0].message, "invalid (fr)");
    }

    #[test]
    fn test_lazy_message_not_evaluated_when_rule_passes() {
        let evaluated = Arc::new(Mutex::new(0));
        let evaluated_clone = Arc::clone(&evaluated);

        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::delegate(
            |o: &Order| o.quantity > 0,
            MessageSource::lazy(move || {
                *evaluated_clone.lock() += 1;
                "unused".to_string()
            }),
        ));

        assert!(rules.evaluate(&metadata(), &Order { quantity: 3 }).unwrap().is_empty());
        assert_eq!(*evaluated.lock(), 0);
    }

    #[test]
    fn test_delegate_rejects_wrong_model_type() {
        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::delegate(|o: &Order| o.quantity > 0, MessageSource::invalid()));

        let result = rules.evaluate(&metadata(), &Invoice);

        match result {
            Err(ValidationError::TypeMismatch { expected, found }) => {
                assert!(expected.ends_with("Order"));
                assert!(found.starts_with("TypeId"), "found: {}", found);
                assert!(!found.contains("Order"), "found: {}", found);
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_names_instance_described_by_metadata() {
        let rule = ValidationRule::delegate(|o: &Order| o.quantity > 0, MessageSource::invalid());
        let invoice_metadata = ModelMetadata::for_property::<Invoice>("total");

        match rule.is_satisfied(&invoice_metadata, &Invoice) {
            Err(ValidationError::TypeMismatch { expected, found }) => {
                assert!(expected.ends_with("::Order"));
                assert!(found.ends_with("::Invoice"));
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_receives_provider_list() {
        struct NoValidators;

        impl ModelValidatorProvider for NoValidators {
            fn get_validators(
                &self,
                _metadata: &ModelMetadata,
                _providers: &[Arc<dyn ModelValidatorProvider>],
            ) -> ValidationResult<Vec<Arc<dyn crate::validator::ModelValidator>>> {
                Ok(Vec::new())
            }
        }

        let mut rules = ValidationRuleSet::new();
        rules.add(ValidationRule::with_providers(
            "providers",
            |_, _, providers| Ok(providers.len() == 2),
            "missing providers".into(),
        ));

        let providers = vec![
            Arc::new(NoValidators) as Arc<dyn ModelValidatorProvider>,
            Arc::new(NoValidators) as Arc<dyn ModelValidatorProvider>,
        ];
        let order = Order { quantity: 1 };

        assert!(rules.evaluate_with(&metadata(), &order, &providers).unwrap().is_empty());
        assert_eq!(rules.evaluate(&metadata(), &order).unwrap()[0].message, "missing providers");
    }

    #[test]
    fn test_value_rule_uses_property_value() {
        let rule = ValidationRule::for_value("positive", |v: &u32| *v > 0, MessageSource::invalid());

        let absent = metadata();
        assert!(rule.is_satisfied(&absent, &Order { quantity: 0 }).unwrap());

        let zero = metadata().with_model(0u32);
        assert!(!rule.is_satisfied(&zero, &Order { quantity: 0 }).unwrap());
        assert_eq!(rule.message(zero.display_name()), "quantity is invalid.");

        let wrong = metadata().with_model("0".to_string());
        assert!(matches!(
            rule.is_satisfied(&wrong, &Order { quantity: 0 }),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}

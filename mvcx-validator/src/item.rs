//! 属性级元数据与流式构建器

use std::any::Any;
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ValidationResult;
use crate::metadata::PropertyValue;
use crate::rule::{MessageSource, ValidationRule, ValidationRuleSet};
use crate::rules::ValidationRules;

/// 属性值访问器（类型擦除）
pub type ValueAccessor = Arc<dyn Fn(&dyn Any) -> Option<PropertyValue> + Send + Sync>;

/// 属性级元数据：显示信息 + 验证规则集
///
/// 每个 (模型类型, 属性) 一份，启动时登记，之后只读共享。
#[derive(Clone, Default)]
pub struct ModelMetadataItem {
    property_name: String,
    display_name: Option<String>,
    short_display_name: Option<String>,
    description: Option<String>,
    read_only: bool,
    hide_for_display: bool,
    hide_for_edit: bool,
    is_required: bool,
    order: Option<i32>,
    accessor: Option<ValueAccessor>,
    validations: ValidationRuleSet,
}

impl ModelMetadataItem {
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            ..Self::default()
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn short_display_name(&self) -> Option<&str> {
        self.short_display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn show_for_display(&self) -> bool {
        !self.hide_for_display
    }

    pub fn show_for_edit(&self) -> bool {
        !self.hide_for_edit
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    /// 属性上登记的验证规则
    pub fn validations(&self) -> &ValidationRuleSet {
        &self.validations
    }

    pub(crate) fn set_accessor(&mut self, accessor: ValueAccessor) {
        self.accessor = Some(accessor);
    }

    /// 通过访问器从模型实例读取属性值
    pub fn read_value(&self, container: &dyn Any) -> Option<PropertyValue> {
        self.accessor.as_ref().and_then(|accessor| accessor(container))
    }
}

impl fmt::Debug for ModelMetadataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelMetadataItem")
            .field("property_name", &self.property_name)
            .field("display_name", &self.display_name)
            .field("is_required", &self.is_required)
            .field("order", &self.order)
            .field("validations", &self.validations.len())
            .finish()
    }
}

/// 属性元数据的流式构建器
///
/// `V` 是属性值的类型，决定可用的内置规则（例如字符串长度只对 `String` 可用）。
/// 每个验证方法只追加一条规则；非法配置立即返回 [`ValidationError::Configuration`]。
///
/// ```rust,ignore
/// let mut item = ModelMetadataItem::new("name");
/// ModelMetadataItemBuilder::<String>::new(&mut item)
///     .display_name("Name")
///     .required()
///     .max_length(20)?
///     .validate::<User, _>(|user| user.name != "admin");
/// ```
///
/// [`ValidationError::Configuration`]: crate::ValidationError::Configuration
pub struct ModelMetadataItemBuilder<'a, V> {
    item: &'a mut ModelMetadataItem,
    _value: PhantomData<fn() -> V>,
}

impl<'a, V: Any> ModelMetadataItemBuilder<'a, V> {
    pub fn new(item: &'a mut ModelMetadataItem) -> Self {
        Self {
            item,
            _value: PhantomData,
        }
    }

    /// 正在构建的元数据项
    pub fn item(&self) -> &ModelMetadataItem {
        self.item
    }

    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.item.display_name = Some(name.into());
        self
    }

    pub fn short_display_name(self, name: impl Into<String>) -> Self {
        self.item.short_display_name = Some(name.into());
        self
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.item.description = Some(description.into());
        self
    }

    pub fn read_only(self) -> Self {
        self.item.read_only = true;
        self
    }

    pub fn hide_for_display(self) -> Self {
        self.item.hide_for_display = true;
        self
    }

    pub fn hide_for_edit(self) -> Self {
        self.item.hide_for_edit = true;
        self
    }

    pub fn order(self, order: i32) -> Self {
        self.item.order = Some(order);
        self
    }

    /// 追加任意规则
    pub fn rule(self, rule: ValidationRule) -> Self {
        tracing::trace!(
            "Adding rule '{}' to property '{}'",
            rule.name(),
            self.item.property_name
        );
        self.item.validations.add(rule);
        self
    }

    /// 基于模型的委托规则，使用默认消息
    pub fn validate<M, F>(self, predicate: F) -> Self
    where
        M: Any,
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.rule(ValidationRule::delegate::<M, F>(predicate, MessageSource::invalid()))
    }

    /// 基于模型的委托规则，使用固定消息
    pub fn validate_with_message<M, F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        M: Any,
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.rule(ValidationRule::delegate::<M, F>(
            predicate,
            MessageSource::Static(message.into()),
        ))
    }

    /// 基于模型的委托规则，消息在验证失败时才求值
    pub fn validate_with<M, F, L>(self, predicate: F, message: L) -> Self
    where
        M: Any,
        F: Fn(&M) -> bool + Send + Sync + 'static,
        L: Fn() -> String + Send + Sync + 'static,
    {
        self.rule(ValidationRule::delegate::<M, F>(predicate, MessageSource::lazy(message)))
    }

    /// 基于属性值的规则
    pub fn must<F>(self, predicate: F, message: impl Into<MessageSource>) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.rule(ValidationRule::for_value("must", predicate, message.into()))
    }

    /// 必填
    pub fn required(self) -> Self {
        self.item.is_required = true;
        self.rule(ValidationRules::required(None))
    }

    /// 必填，使用自定义消息
    pub fn required_with(self, message: impl Into<MessageSource>) -> Self {
        self.item.is_required = true;
        self.rule(ValidationRules::required(Some(message.into())))
    }
}

impl<'a> ModelMetadataItemBuilder<'a, String> {
    pub fn min_length(self, min: usize) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::length(Some(min), None, None)?))
    }

    pub fn max_length(self, max: usize) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::length(None, Some(max), None)?))
    }

    pub fn length(self, min: usize, max: usize) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::length(Some(min), Some(max), None)?))
    }

    pub fn email(self) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::email(None)?))
    }

    /// 正则匹配
    pub fn matches(self, pattern: &str) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::pattern(pattern, None)?))
    }

    /// 正则匹配，使用自定义消息
    pub fn matches_with(self, pattern: &str, message: impl Into<MessageSource>) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::pattern(pattern, Some(message.into()))?))
    }
}

impl<'a, V> ModelMetadataItemBuilder<'a, V>
where
    V: PartialOrd + Display + Any + Send + Sync,
{
    /// 数值范围（闭区间）
    pub fn range(self, min: V, max: V) -> ValidationResult<Self> {
        Ok(self.rule(ValidationRules::range(min, max, None)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    struct Product;

    #[test]
    fn test_builder_sets_display_metadata() {
        let mut item = ModelMetadataItem::new("price");
        ModelMetadataItemBuilder::<u32>::new(&mut item)
            .display_name("Unit price")
            .short_display_name("Price")
            .description("Price in cents")
            .read_only()
            .hide_for_edit()
            .order(2);

        assert_eq!(item.property_name(), "price");
        assert_eq!(item.display_name(), Some("Unit price"));
        assert_eq!(item.short_display_name(), Some("Price"));
        assert_eq!(item.description(), Some("Price in cents"));
        assert!(item.is_read_only());
        assert!(item.show_for_display());
        assert!(!item.show_for_edit());
        assert_eq!(item.order(), Some(2));
        assert!(item.validations().is_empty());
    }

    #[test]
    fn test_each_validation_call_appends_one_rule_in_order() {
        let mut item = ModelMetadataItem::new("name");
        ModelMetadataItemBuilder::<String>::new(&mut item)
            .required()
            .max_length(10)
            .unwrap()
            .validate::<Product, _>(|_| true)
            .must(|value: &String| value != "root", "reserved");

        let names: Vec<_> = item.validations().iter().map(|rule| rule.name()).collect();
        assert_eq!(names, vec!["required", "length", "delegate", "must"]);
        assert!(item.is_required());
    }

    #[test]
    fn test_configuration_errors_fail_immediately() {
        let mut item = ModelMetadataItem::new("code");
        let result = ModelMetadataItemBuilder::<String>::new(&mut item).matches("(unclosed");
        assert!(matches!(result, Err(ValidationError::Configuration(_))));

        let mut item = ModelMetadataItem::new("age");
        let result = ModelMetadataItemBuilder::<u8>::new(&mut item).range(10, 1);
        assert!(matches!(result, Err(ValidationError::Configuration(_))));
        assert!(item.validations().is_empty());
    }

    #[test]
    fn test_item_without_accessor_reads_no_value() {
        let item = ModelMetadataItem::new("name");
        assert!(item.read_value(&Product).is_none());
    }
}

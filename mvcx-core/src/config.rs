//! 启动配置
//!
//! 配置键为点分形式（`mvcx.controllers.excluded`），可以来自 TOML、环境变量或内存。
//! 多个来源按优先级合并，高优先级先命中。

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{ApplicationError, ApplicationResult};

/// 配置值
///
/// 启动配置只需要开关和名称列表，其余标量统一保存为字符串。
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 布尔值，也接受 "true" / "yes" / "1" 等字符串
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            ConfigValue::Array(_) => None,
        }
    }

    /// 名称列表：数组，或逗号分隔的字符串
    pub fn to_string_list(&self) -> Option<Vec<String>> {
        match self {
            ConfigValue::Array(values) => Some(
                values
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect(),
            ),
            ConfigValue::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            ConfigValue::Bool(_) => None,
        }
    }
}

/// 配置源
pub trait PropertySource: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 数字越大优先级越高
    fn priority(&self) -> i32 {
        0
    }
}

/// 按优先级合并的配置
pub struct Environment {
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources = self.sources.read();
        let names: Vec<&str> = sources.iter().map(|source| source.name()).collect();
        f.debug_struct("Environment").field("sources", &names).finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(
            "Adding property source '{}' (priority: {})",
            source.name(),
            source.priority()
        );
        sources.push(source);
        // 稳定排序：同优先级保持添加顺序
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub fn with_property_source(self, source: Box<dyn PropertySource>) -> Self {
        self.add_property_source(source);
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        let found = sources
            .iter()
            .find_map(|source| source.get(key).map(|value| (source.name().to_string(), value)));

        match found {
            Some((source, value)) => {
                tracing::trace!("Config '{}' found in source '{}'", key, source);
                Some(value)
            }
            None => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|value| value.as_str().map(str::to_string))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// 字符串列表：`["a", "b"]` 或 `"a, b"`
    pub fn get_string_array(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(|value| value.to_string_list())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// 环境变量配置源
///
/// 构造时对变量做一次快照。配置键映射为大写、`.` 与 `-` 都换成 `_`：
/// `mvcx.controllers.excluded-origins` → `MVCX_CONTROLLERS_EXCLUDED_ORIGINS`。
/// 映射不可逆，所以只支持按键查找。
pub struct EnvironmentPropertySource {
    prefix: String,
    variables: HashMap<String, String>,
}

impl EnvironmentPropertySource {
    /// 读取当前进程的环境变量
    pub fn new() -> Self {
        Self::from_vars("", std::env::vars())
    }

    /// 只保留带前缀的变量，查找时自动补上前缀
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    pub fn from_vars(
        prefix: impl Into<String>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let prefix = prefix.into();
        let variables = vars
            .into_iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .collect();
        Self { prefix, variables }
    }

    /// 配置键对应的环境变量名
    pub fn variable_name(&self, key: &str) -> String {
        let normalized: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}", self.prefix, normalized)
    }
}

impl Default for EnvironmentPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.variables
            .get(&self.variable_name(key))
            .cloned()
            .map(ConfigValue::String)
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// TOML 配置源，表会被展平为点分键
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
}

impl TomlPropertySource {
    pub fn parse(content: &str, name: impl Into<String>) -> ApplicationResult<Self> {
        let name = name.into();
        let table: toml::Table = content
            .parse()
            .map_err(|e| ApplicationError::Config(format!("Failed to parse {}: {}", name, e)))?;

        let mut properties = HashMap::new();
        for (key, value) in &table {
            flatten(key.clone(), value, &mut properties);
        }

        Ok(Self { name, properties })
    }
}

fn flatten(key: String, value: &toml::Value, properties: &mut HashMap<String, ConfigValue>) {
    match value {
        toml::Value::Table(table) => {
            for (child, value) in table {
                flatten(format!("{}.{}", key, child), value, properties);
            }
        }
        other => {
            if let Some(value) = scalar(other) {
                properties.insert(key, value);
            }
        }
    }
}

fn scalar(value: &toml::Value) -> Option<ConfigValue> {
    match value {
        toml::Value::String(s) => Some(ConfigValue::String(s.clone())),
        toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
        toml::Value::Integer(i) => Some(ConfigValue::String(i.to_string())),
        toml::Value::Float(f) => Some(ConfigValue::String(f.to_string())),
        toml::Value::Datetime(dt) => Some(ConfigValue::String(dt.to_string())),
        toml::Value::Array(values) => Some(ConfigValue::Array(values.iter().filter_map(scalar).collect())),
        toml::Value::Table(_) => None,
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }
}

/// 内存配置源
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[mvcx.controllers]
excluded = false
ignored = ["LegacyController", "HealthController"]
excluded-origins = "mvcx_web, admin_tools"

[mvcx.logging]
level = "debug"
"#;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_toml_source_flattens_tables() {
        let source = TomlPropertySource::parse(SAMPLE, "application.toml").unwrap();

        assert_eq!(source.name(), "application.toml");
        assert_eq!(source.get("mvcx.controllers.excluded"), Some(ConfigValue::Bool(false)));
        assert_eq!(
            source.get("mvcx.logging.level"),
            Some(ConfigValue::String("debug".into()))
        );
        assert!(source.get("mvcx.controllers").is_none());
    }

    #[test]
    fn test_toml_numbers_become_strings() {
        let source = TomlPropertySource::parse("[mvcx]\nretries = 3\nids = [1, 2]", "numbers.toml").unwrap();

        assert_eq!(source.get("mvcx.retries"), Some(ConfigValue::String("3".into())));
        assert_eq!(
            source.get("mvcx.ids").and_then(|value| value.to_string_list()),
            Some(vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlPropertySource::parse("[broken", "broken.toml");
        assert!(matches!(result, Err(ApplicationError::Config(message)) if message.contains("broken.toml")));
    }

    #[test]
    fn test_string_arrays_from_array_and_csv() {
        let env = Environment::new().with_property_source(Box::new(
            TomlPropertySource::parse(SAMPLE, "application.toml").unwrap(),
        ));

        assert_eq!(
            env.get_string_array("mvcx.controllers.ignored").unwrap(),
            vec!["LegacyController", "HealthController"]
        );
        assert_eq!(
            env.get_string_array("mvcx.controllers.excluded-origins").unwrap(),
            vec!["mvcx_web", "admin_tools"]
        );
        assert!(env.get_string_array("mvcx.controllers.excluded").is_none());
        assert!(env.get_string_array("missing.key").is_none());
    }

    #[test]
    fn test_higher_priority_source_wins() {
        let env = Environment::new()
            .with_property_source(Box::new(
                MapPropertySource::new("low")
                    .with_property("mvcx.controllers.excluded", ConfigValue::Bool(false))
                    .with_priority(1),
            ))
            .with_property_source(Box::new(
                MapPropertySource::new("high")
                    .with_property("mvcx.controllers.excluded", ConfigValue::String("yes".into()))
                    .with_priority(10),
            ));

        assert!(env.get_bool_or("mvcx.controllers.excluded", false));
        assert!(!env.get_bool_or("absent", false));
    }

    #[test]
    fn test_environment_variable_names_are_normalized() {
        let source = EnvironmentPropertySource::from_vars("", Vec::new());

        assert_eq!(
            source.variable_name("mvcx.controllers.excluded-origins"),
            "MVCX_CONTROLLERS_EXCLUDED_ORIGINS"
        );
        assert_eq!(
            EnvironmentPropertySource::from_vars("APP_", Vec::new()).variable_name("mvcx.logging.level"),
            "APP_MVCX_LOGGING_LEVEL"
        );
    }

    #[test]
    fn test_hyphenated_key_read_from_environment_variable() {
        let env = Environment::new().with_property_source(Box::new(EnvironmentPropertySource::from_vars(
            "",
            vars(&[
                ("MVCX_CONTROLLERS_EXCLUDED_ORIGINS", "app, admin"),
                ("MVCX_CONTROLLERS_EXCLUDED", "true"),
            ]),
        )));

        assert_eq!(
            env.get_string_array("mvcx.controllers.excluded-origins").unwrap(),
            vec!["app", "admin"]
        );
        assert!(env.get_bool_or("mvcx.controllers.excluded", false));
    }

    #[test]
    fn test_prefixed_environment_source_ignores_other_variables() {
        let source = EnvironmentPropertySource::from_vars(
            "TEST_",
            vars(&[("TEST_MVCX_LOGGING_LEVEL", "warn"), ("MVCX_LOGGING_FORMAT", "json")]),
        );

        assert_eq!(source.get("mvcx.logging.level"), Some(ConfigValue::String("warn".into())));
        assert!(source.get("mvcx.logging.format").is_none());
    }

    #[test]
    fn test_environment_variables_override_toml() {
        let env = Environment::new()
            .with_property_source(Box::new(TomlPropertySource::parse(SAMPLE, "application.toml").unwrap()))
            .with_property_source(Box::new(EnvironmentPropertySource::from_vars(
                "",
                vars(&[("MVCX_LOGGING_LEVEL", "error")]),
            )));

        assert_eq!(env.get_string("mvcx.logging.level").as_deref(), Some("error"));
        assert_eq!(
            env.get_string_array("mvcx.controllers.ignored").unwrap().len(),
            2
        );
    }
}

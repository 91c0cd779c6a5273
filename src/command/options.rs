//! Option declarations and their normalization into a parser configuration.
//!
//! Option types are only known once the command is resolved, so argv is
//! parsed twice: an untyped pass to find the command, then a typed pass
//! driven by the [`ParserConfig`] built here.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    String,
    Boolean,
}

impl OptionType {
    /// Zero value used when an option declares no default.
    pub fn zero_value(&self) -> OptionValue {
        match self {
            OptionType::String => OptionValue::Null,
            OptionType::Boolean => OptionValue::Bool(false),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::String => write!(f, "string"),
            OptionType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A parsed option value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    Null,
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Null)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

/// Declared option of a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub option_type: Option<OptionType>,
    pub default: Option<OptionValue>,
    pub aliases: Vec<String>,
    /// Never reported to telemetry.
    pub private: bool,
    /// Groups options that are forwarded to a particular collaborator.
    pub intent: Option<String>,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn boolean(mut self) -> Self {
        self.option_type = Some(OptionType::Boolean);
        self
    }

    pub fn string(mut self) -> Self {
        self.option_type = Some(OptionType::String);
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn resolved_type(&self) -> OptionType {
        self.option_type.unwrap_or_default()
    }

    pub fn resolved_default(&self) -> OptionValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.resolved_type().zero_value())
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// Parser configuration derived from a command's option list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    pub string: Vec<String>,
    pub boolean: Vec<String>,
    pub alias: HashMap<String, Vec<String>>,
    pub default: HashMap<String, OptionValue>,
}

impl ParserConfig {
    pub fn normalize(options: &[OptionSpec]) -> Self {
        let mut config = Self::default();

        for option in options {
            match option.resolved_type() {
                OptionType::String => config.string.push(option.name.clone()),
                OptionType::Boolean => config.boolean.push(option.name.clone()),
            }
            config
                .default
                .insert(option.name.clone(), option.resolved_default());
            config
                .alias
                .insert(option.name.clone(), option.aliases.clone());
        }

        config
    }

    pub fn type_of(&self, name: &str) -> Option<OptionType> {
        if self.boolean.iter().any(|n| n == name) {
            Some(OptionType::Boolean)
        } else if self.string.iter().any(|n| n == name) {
            Some(OptionType::String)
        } else {
            None
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.string
            .iter()
            .chain(self.boolean.iter())
            .map(String::as_str)
    }
}

/// Typed option values for one invocation, keyed by canonical option name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ParsedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &OptionValue) -> bool) {
        self.values.retain(|k, v| keep(k, v));
    }

    /// Options whose declaration carries `intent`, or carries no intent when `None`.
    /// Undeclared options are dropped.
    pub fn filter_by_intent(&self, specs: &[OptionSpec], intent: Option<&str>) -> ParsedOptions {
        let mut filtered = self.clone();
        filtered.retain(|name, _| {
            specs
                .iter()
                .find(|spec| spec.matches(name))
                .is_some_and(|spec| spec.intent.as_deref() == intent)
        });
        filtered
    }

    /// Renders options back into argv form: `--name=value` for strings,
    /// `--name` for true booleans; false and null values are omitted.
    pub fn to_argv(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|(name, value)| match value {
                OptionValue::Bool(true) => Some(format!("--{}", name)),
                OptionValue::String(s) => Some(format!("--{}={}", name, s)),
                OptionValue::Bool(false) | OptionValue::Null => None,
            })
            .collect()
    }
}

impl FromIterator<(String, OptionValue)> for ParsedOptions {
    fn from_iter<T: IntoIterator<Item = (String, OptionValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_option_defaults_to_string_and_null() {
        let config = ParserConfig::normalize(&[OptionSpec::new("name", "Name")]);
        assert_eq!(config.string, vec!["name".to_string()]);
        assert!(config.boolean.is_empty());
        assert_eq!(config.default.get("name"), Some(&OptionValue::Null));
        assert_eq!(config.alias.get("name"), Some(&Vec::new()));
    }

    #[test]
    fn test_boolean_option_defaults_to_false() {
        let config = ParserConfig::normalize(&[OptionSpec::new("skip-deps", "Skip").boolean()]);
        assert_eq!(config.boolean, vec!["skip-deps".to_string()]);
        assert_eq!(config.default.get("skip-deps"), Some(&OptionValue::Bool(false)));
        assert_eq!(config.type_of("skip-deps"), Some(OptionType::Boolean));
    }

    #[test]
    fn test_explicit_default_and_aliases_kept() {
        let config = ParserConfig::normalize(&[OptionSpec::new("type", "Project type")
            .default_value("ionic-angular")
            .alias("t")]);
        assert_eq!(
            config.default.get("type"),
            Some(&OptionValue::String("ionic-angular".into()))
        );
        assert_eq!(config.alias.get("type"), Some(&vec!["t".to_string()]));
    }

    #[test]
    fn test_to_argv_omits_false_and_null() {
        let options: ParsedOptions = [
            ("skip-deps".to_string(), OptionValue::Bool(true)),
            ("list".to_string(), OptionValue::Bool(false)),
            ("type".to_string(), OptionValue::from("ionic1")),
            ("name".to_string(), OptionValue::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(options.to_argv(), vec!["--skip-deps", "--type=ionic1"]);
    }

    #[test]
    fn test_filter_by_intent() {
        let specs = vec![
            OptionSpec::new("prod", "Production build").boolean().intent("app-scripts"),
            OptionSpec::new("platform", "Target platform"),
        ];
        let options: ParsedOptions = [
            ("prod".to_string(), OptionValue::Bool(true)),
            ("platform".to_string(), OptionValue::from("ios")),
            ("unknown".to_string(), OptionValue::Bool(true)),
        ]
        .into_iter()
        .collect();

        let scripts = options.filter_by_intent(&specs, Some("app-scripts"));
        assert_eq!(scripts.len(), 1);
        assert!(scripts.flag("prod"));

        let plain = options.filter_by_intent(&specs, None);
        assert_eq!(plain.len(), 1);
        assert_eq!(plain.string("platform"), Some("ios"));
    }
}

/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Processing options and their serializable configuration form.

use crate::error::MergeResult;
use crate::format::{BooleanFormatter, BooleanFormatterRegistry, Locale, ValueFormatter};
use serde::{Deserialize, Serialize};

/// What to do with a placeholder whose target cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingVariablePolicy {
    /// Keep the `{{...}}` text and record a warning.
    #[default]
    LeaveUnchanged,
    /// Remove the placeholder and record a warning.
    ReplaceEmpty,
    /// Abort processing.
    Fail,
}

/// A literal text substitution applied to every paragraph before markup is
/// scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub find: String,
    pub replace: String,
}

/// Options for one processor.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    pub missing_variables: MissingVariablePolicy,
    pub locale: Locale,
    pub boolean_formatters: BooleanFormatterRegistry,
    pub replacements: Vec<Replacement>,
    /// Turn `**bold**` style markup in substituted strings into formatting.
    pub emphasis_markup: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            missing_variables: MissingVariablePolicy::default(),
            locale: Locale::invariant(),
            boolean_formatters: BooleanFormatterRegistry::with_builtins(),
            replacements: Vec::new(),
            emphasis_markup: true,
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_variables(mut self, policy: MissingVariablePolicy) -> Self {
        self.missing_variables = policy;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Register a boolean formatter under `name`.
    pub fn with_boolean_formatter(
        mut self,
        name: impl AsRef<str>,
        formatter: impl BooleanFormatter + Send + Sync + 'static,
    ) -> Self {
        self.boolean_formatters.register(name, formatter);
        self
    }

    pub fn with_replacement(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.replacements.push(Replacement {
            find: find.into(),
            replace: replace.into(),
        });
        self
    }

    pub fn with_emphasis_markup(mut self, enabled: bool) -> Self {
        self.emphasis_markup = enabled;
        self
    }

    pub(crate) fn value_formatter(&self) -> ValueFormatter<'_> {
        ValueFormatter::new(&self.locale, &self.boolean_formatters)
    }
}

/// Serializable processing configuration.
///
/// Field names use kebab-case in JSON (`missing-variables`,
/// `emphasis-markup`). Absent fields keep the defaults of
/// [`ProcessingOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessingConfig {
    /// Missing-variable policy (default: leave-unchanged)
    #[serde(default)]
    pub missing_variables: MissingVariablePolicy,

    /// Locale tag such as `de-DE` (default: invariant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Emphasis markup in substituted strings (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis_markup: Option<bool>,

    /// Literal substitutions, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<Replacement>,
}

impl ProcessingConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> MergeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build processing options, validating the locale tag.
    ///
    /// Boolean formatters start from the built-in set.
    pub fn into_options(self) -> MergeResult<ProcessingOptions> {
        let locale = match self.locale.as_deref() {
            Some(tag) => Locale::from_tag(tag)?,
            None => Locale::invariant(),
        };
        Ok(ProcessingOptions {
            missing_variables: self.missing_variables,
            locale,
            boolean_formatters: BooleanFormatterRegistry::with_builtins(),
            replacements: self.replacements,
            emphasis_markup: self.emphasis_markup.unwrap_or(true),
        })
    }
}

impl TryFrom<ProcessingConfig> for ProcessingOptions {
    type Error = crate::error::MergeError;

    fn try_from(config: ProcessingConfig) -> MergeResult<Self> {
        config.into_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = ProcessingOptions::default();
        assert_eq!(options.missing_variables, MissingVariablePolicy::LeaveUnchanged);
        assert_eq!(options.locale, Locale::invariant());
        assert!(options.emphasis_markup);
        assert!(options.boolean_formatters.contains("checkbox"));
    }

    #[test]
    fn test_config_from_json() {
        let config = ProcessingConfig::from_json_str(
            r#"{
                "missing-variables": "replace-empty",
                "locale": "de-DE",
                "emphasis-markup": false,
                "replacements": [{ "find": "(c)", "replace": "©" }]
            }"#,
        )
        .unwrap();
        let options = config.into_options().unwrap();

        assert_eq!(options.missing_variables, MissingVariablePolicy::ReplaceEmpty);
        assert_eq!(options.locale.tag(), "de-DE");
        assert!(!options.emphasis_markup);
        assert_eq!(options.replacements[0].replace, "©");
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let options = ProcessingConfig::from_json_str("{}")
            .unwrap()
            .into_options()
            .unwrap();
        assert_eq!(options.missing_variables, MissingVariablePolicy::LeaveUnchanged);
        assert!(options.emphasis_markup);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            ProcessingConfig::from_json_str(r#"{"missing-variables": "explode"}"#),
            Err(MergeError::Json(_))
        ));
        let config = ProcessingConfig {
            locale: Some("tlh-QO".to_string()),
            ..ProcessingConfig::default()
        };
        assert!(matches!(
            ProcessingOptions::try_from(config),
            Err(MergeError::Config { .. })
        ));
    }
}

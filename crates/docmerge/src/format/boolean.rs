/*
 * boolean.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Named boolean formatters.
//!
//! `{{Approved:checkbox}}` renders a boolean through the formatter registered
//! under `checkbox`. Names are matched case-insensitively. Hosts can add
//! their own formatters per processor, either by implementing
//! [`BooleanFormatter`] or with a closure.

use super::Locale;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts a boolean to display text.
pub trait BooleanFormatter {
    fn format(&self, value: bool, locale: &Locale) -> String;
}

impl<F> BooleanFormatter for F
where
    F: Fn(bool, &Locale) -> String,
{
    fn format(&self, value: bool, locale: &Locale) -> String {
        self(value, locale)
    }
}

/// A formatter that prints one of two fixed symbols.
#[derive(Debug, Clone, Copy)]
pub struct SymbolFormatter {
    pub on: &'static str,
    pub off: &'static str,
}

impl BooleanFormatter for SymbolFormatter {
    fn format(&self, value: bool, _locale: &Locale) -> String {
        let symbol = if value { self.on } else { self.off };
        symbol.to_string()
    }
}

/// A formatter that prints a word pair chosen by the locale's language.
///
/// The first entry is used for languages without their own words.
#[derive(Debug, Clone, Copy)]
pub struct WordFormatter {
    words: &'static [(&'static str, &'static str, &'static str)],
}

impl BooleanFormatter for WordFormatter {
    fn format(&self, value: bool, locale: &Locale) -> String {
        let Some(&fallback) = self.words.first() else {
            return value.to_string();
        };
        let (_, on, off) = self
            .words
            .iter()
            .copied()
            .find(|(language, _, _)| *language == locale.language())
            .unwrap_or(fallback);
        let word = if value { on } else { off };
        word.to_string()
    }
}

const YES_NO: WordFormatter = WordFormatter {
    words: &[
        ("en", "Yes", "No"),
        ("de", "Ja", "Nein"),
        ("fr", "Oui", "Non"),
        ("es", "Sí", "No"),
    ],
};

const TRUE_FALSE: WordFormatter = WordFormatter {
    words: &[
        ("en", "True", "False"),
        ("de", "Wahr", "Falsch"),
        ("fr", "Vrai", "Faux"),
        ("es", "Verdadero", "Falso"),
    ],
};

const ON_OFF: WordFormatter = WordFormatter {
    words: &[
        ("en", "On", "Off"),
        ("de", "Ein", "Aus"),
        ("fr", "Marche", "Arrêt"),
        ("es", "Encendido", "Apagado"),
    ],
};

const ENABLED: WordFormatter = WordFormatter {
    words: &[
        ("en", "Enabled", "Disabled"),
        ("de", "Aktiviert", "Deaktiviert"),
        ("fr", "Activé", "Désactivé"),
        ("es", "Habilitado", "Deshabilitado"),
    ],
};

const ACTIVE: WordFormatter = WordFormatter {
    words: &[
        ("en", "Active", "Inactive"),
        ("de", "Aktiv", "Inaktiv"),
        ("fr", "Actif", "Inactif"),
        ("es", "Activo", "Inactivo"),
    ],
};

type SharedFormatter = Arc<dyn BooleanFormatter + Send + Sync>;

/// Name to formatter lookup.
#[derive(Clone)]
pub struct BooleanFormatterRegistry {
    formatters: HashMap<String, SharedFormatter>,
}

impl BooleanFormatterRegistry {
    /// A registry with no formatters at all.
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// A registry with the built-in formatters: `checkbox`, `checkmark`,
    /// `yesno`, `truefalse`, `onoff`, `enabled` and `active`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "checkbox",
            SymbolFormatter {
                on: "\u{2611}",
                off: "\u{2610}",
            },
        );
        registry.register(
            "checkmark",
            SymbolFormatter {
                on: "\u{2713}",
                off: "\u{2717}",
            },
        );
        registry.register("yesno", YES_NO);
        registry.register("truefalse", TRUE_FALSE);
        registry.register("onoff", ON_OFF);
        registry.register("enabled", ENABLED);
        registry.register("active", ACTIVE);
        registry
    }

    /// Register a formatter, replacing any existing one with the same name.
    pub fn register(
        &mut self,
        name: impl AsRef<str>,
        formatter: impl BooleanFormatter + Send + Sync + 'static,
    ) -> &mut Self {
        self.formatters
            .insert(name.as_ref().to_lowercase(), Arc::new(formatter));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SharedFormatter> {
        self.formatters.get(&name.trim().to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for BooleanFormatterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for BooleanFormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanFormatterRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn format(registry: &BooleanFormatterRegistry, name: &str, value: bool, tag: &str) -> String {
        let locale = Locale::from_tag(tag).unwrap();
        registry.get(name).unwrap().format(value, &locale)
    }

    #[test]
    fn test_builtins() {
        let registry = BooleanFormatterRegistry::default();
        assert_eq!(format(&registry, "checkbox", true, ""), "\u{2611}");
        assert_eq!(format(&registry, "checkbox", false, ""), "\u{2610}");
        assert_eq!(format(&registry, "checkmark", false, ""), "\u{2717}");
        assert_eq!(format(&registry, "YesNo", true, ""), "Yes");
        assert_eq!(format(&registry, "active", false, ""), "Inactive");
        assert_eq!(
            registry.names(),
            vec!["active", "checkbox", "checkmark", "enabled", "onoff", "truefalse", "yesno"]
        );
    }

    #[test]
    fn test_word_formatters_are_localized() {
        let registry = BooleanFormatterRegistry::default();
        assert_eq!(format(&registry, "yesno", true, "de-DE"), "Ja");
        assert_eq!(format(&registry, "yesno", false, "fr-FR"), "Non");
        assert_eq!(format(&registry, "enabled", true, "es-ES"), "Habilitado");
        assert_eq!(format(&registry, "onoff", true, "en-GB"), "On");
        // Symbols do not depend on the locale.
        assert_eq!(format(&registry, "checkbox", true, "de-DE"), "\u{2611}");
    }

    #[test]
    fn test_custom_formatter_closure() {
        let mut registry = BooleanFormatterRegistry::empty();
        registry.register("Thumbs", |value: bool, _: &Locale| {
            String::from(if value { "up" } else { "down" })
        });
        assert_eq!(format(&registry, "thumbs", true, ""), "up");
        assert!(!registry.contains("checkbox"));
    }
}

/*
 * locale.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{MergeError, MergeResult};
use std::fmt;

/// Culture-specific conventions used when converting values to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    tag: &'static str,
    language: &'static str,
    decimal: char,
    group: char,
    percent: &'static str,
    date: &'static str,
    datetime: &'static str,
}

const INVARIANT: Locale = Locale {
    tag: "invariant",
    language: "en",
    decimal: '.',
    group: ',',
    percent: "%",
    date: "%Y-%m-%d",
    datetime: "%Y-%m-%d %H:%M:%S",
};

const KNOWN: &[Locale] = &[
    INVARIANT,
    Locale {
        tag: "en-US",
        language: "en",
        decimal: '.',
        group: ',',
        percent: "%",
        date: "%m/%d/%Y",
        datetime: "%m/%d/%Y %I:%M %p",
    },
    Locale {
        tag: "en-GB",
        language: "en",
        decimal: '.',
        group: ',',
        percent: "%",
        date: "%d/%m/%Y",
        datetime: "%d/%m/%Y %H:%M",
    },
    Locale {
        tag: "de-DE",
        language: "de",
        decimal: ',',
        group: '.',
        percent: "\u{a0}%",
        date: "%d.%m.%Y",
        datetime: "%d.%m.%Y %H:%M",
    },
    Locale {
        tag: "fr-FR",
        language: "fr",
        decimal: ',',
        group: '\u{202f}',
        percent: "\u{a0}%",
        date: "%d/%m/%Y",
        datetime: "%d/%m/%Y %H:%M",
    },
    Locale {
        tag: "es-ES",
        language: "es",
        decimal: ',',
        group: '.',
        percent: "\u{a0}%",
        date: "%d/%m/%Y",
        datetime: "%d/%m/%Y %H:%M",
    },
];

impl Locale {
    /// The culture-neutral locale: `.` decimals, `,` groups, ISO dates.
    pub const fn invariant() -> Self {
        INVARIANT
    }

    /// Look up a locale by tag (`de-DE`, `de_de`, `invariant`).
    ///
    /// # Errors
    /// Unknown tags are a [`MergeError::Config`].
    pub fn from_tag(tag: &str) -> MergeResult<Self> {
        let wanted = tag.trim().replace('_', "-");
        if wanted.is_empty() {
            return Ok(INVARIANT);
        }
        KNOWN
            .iter()
            .find(|locale| locale.tag.eq_ignore_ascii_case(&wanted))
            .copied()
            .ok_or_else(|| MergeError::Config {
                message: format!(
                    "unknown locale '{tag}', expected one of: {}",
                    KNOWN.iter().map(|l| l.tag).collect::<Vec<_>>().join(", ")
                ),
            })
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Two-letter language code, `en` for the invariant locale.
    pub fn language(&self) -> &'static str {
        self.language
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal
    }

    pub fn group_separator(&self) -> char {
        self.group
    }

    pub(crate) fn percent_suffix(&self) -> &'static str {
        self.percent
    }

    /// Default `strftime` pattern for dates.
    pub fn date_pattern(&self) -> &'static str {
        self.date
    }

    /// Default `strftime` pattern for date-times.
    pub fn datetime_pattern(&self) -> &'static str {
        self.datetime
    }
}

impl Default for Locale {
    fn default() -> Self {
        INVARIANT
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Locale::from_tag("de-de").unwrap().tag(), "de-DE");
        assert_eq!(Locale::from_tag("fr_FR").unwrap().decimal_separator(), ',');
        assert_eq!(Locale::from_tag("").unwrap(), Locale::invariant());
        assert_eq!(Locale::from_tag("Invariant").unwrap(), Locale::invariant());
    }

    #[test]
    fn test_unknown_locale() {
        let err = Locale::from_tag("xx-YY").unwrap_err();
        assert!(matches!(err, MergeError::Config { .. }));
        assert!(err.to_string().contains("xx-YY"));
    }
}

/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Value to text conversion.
//!
//! A placeholder may carry a format specifier after a colon
//! (`{{Total:N2}}`, `{{Due:%d %B %Y}}`, `{{Paid:checkbox}}`). The specifier is
//! interpreted according to the value's type:
//!
//! - booleans: the name of a registered [`BooleanFormatter`]
//! - numbers: `N<d>` grouped, `F<d>` fixed, `P<d>` percent, `D<d>` zero-padded
//! - dates, date-times and ISO-8601 strings: a `strftime` pattern
//! - lists: applied to each element
//!
//! A specifier that does not apply falls back to the default conversion.

mod boolean;
mod locale;

pub use boolean::{BooleanFormatter, BooleanFormatterRegistry, SymbolFormatter, WordFormatter};
pub use locale::Locale;

use crate::value::Value;
use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

/// Converts values to text under a locale and a boolean formatter registry.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter<'a> {
    locale: &'a Locale,
    booleans: &'a BooleanFormatterRegistry,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(locale: &'a Locale, booleans: &'a BooleanFormatterRegistry) -> Self {
        Self { locale, booleans }
    }

    /// Format a value with an optional specifier.
    pub fn format(&self, value: &Value, spec: Option<&str>) -> String {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.default_text(value);
        };
        match self.format_with(value, spec) {
            Some(text) => text,
            None => {
                tracing::debug!(
                    spec,
                    value_type = value.type_name(),
                    "format specifier does not apply, using default conversion"
                );
                self.default_text(value)
            }
        }
    }

    fn format_with(&self, value: &Value, spec: &str) -> Option<String> {
        match value {
            Value::Bool(b) => self
                .booleans
                .get(spec)
                .map(|formatter| formatter.format(*b, self.locale)),
            Value::Integer(_) | Value::Float(_) => {
                let (style, precision) = NumberStyle::parse(spec)?;
                format_number(value, style, precision, self.locale)
            }
            Value::Date(_) | Value::DateTime(_) => format_datetime(value.as_datetime()?, spec),
            Value::String(_) => match value.as_datetime() {
                Some(datetime) => format_datetime(datetime, spec),
                None => {
                    let (style, precision) = NumberStyle::parse(spec)?;
                    let number = Value::Float(value.as_f64()?);
                    format_number(&number, style, precision, self.locale)
                }
            },
            Value::List(items) => Some(
                items
                    .iter()
                    .map(|item| self.format(item, Some(spec)))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Map(_) | Value::Null => None,
        }
    }

    /// Conversion used when no specifier is given or it does not apply.
    pub fn default_text(&self, value: &Value) -> String {
        match value {
            Value::Null | Value::Map(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => localize_decimal(&f.to_string(), self.locale),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format(self.locale.date_pattern()).to_string(),
            Value::DateTime(dt) => dt.format(self.locale.datetime_pattern()).to_string(),
            Value::List(items) => items
                .iter()
                .map(|item| self.default_text(item))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberStyle {
    Grouped,
    Fixed,
    Percent,
    Digits,
}

impl NumberStyle {
    /// Parse `N2`, `f0`, `P`, `D6` style specifiers.
    fn parse(spec: &str) -> Option<(Self, Option<usize>)> {
        let mut chars = spec.chars();
        let style = match chars.next()?.to_ascii_uppercase() {
            'N' => NumberStyle::Grouped,
            'F' => NumberStyle::Fixed,
            'P' => NumberStyle::Percent,
            'D' => NumberStyle::Digits,
            _ => return None,
        };
        let rest = chars.as_str();
        let precision = if rest.is_empty() {
            None
        } else {
            Some(rest.parse::<usize>().ok().filter(|p| *p <= 20)?)
        };
        Some((style, precision))
    }
}

fn format_number(
    value: &Value,
    style: NumberStyle,
    precision: Option<usize>,
    locale: &Locale,
) -> Option<String> {
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    let text = match style {
        NumberStyle::Grouped => fixed(number, precision.unwrap_or(2), true, locale),
        NumberStyle::Fixed => fixed(number, precision.unwrap_or(2), false, locale),
        NumberStyle::Percent => {
            let mut text = fixed(number * 100.0, precision.unwrap_or(2), true, locale);
            text.push_str(locale.percent_suffix());
            text
        }
        NumberStyle::Digits => {
            let integer = match value {
                Value::Integer(i) => *i,
                _ if number.fract() == 0.0 && number.abs() < i64::MAX as f64 => number as i64,
                _ => return None,
            };
            let width = precision.unwrap_or(0);
            let digits = format!("{:0width$}", integer.unsigned_abs());
            if integer < 0 {
                format!("-{digits}")
            } else {
                digits
            }
        }
    };
    Some(text)
}

fn fixed(number: f64, decimals: usize, grouped: bool, locale: &Locale) -> String {
    let text = format!("{:.*}", decimals, number.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::new();
    let rounds_to_zero = !text.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if number.is_sign_negative() && !rounds_to_zero {
        out.push('-');
    }
    if grouped {
        out.push_str(&group_digits(integer, locale.group_separator()));
    } else {
        out.push_str(integer);
    }
    if !fraction.is_empty() {
        out.push(locale.decimal_separator());
        out.push_str(fraction);
    }
    out
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

fn localize_decimal(text: &str, locale: &Locale) -> String {
    match locale.decimal_separator() {
        '.' => text.to_string(),
        other => text.replace('.', other.encode_utf8(&mut [0; 4])),
    }
}

/// Format with a `strftime` pattern; invalid patterns yield `None`.
fn format_datetime(datetime: NaiveDateTime, pattern: &str) -> Option<String> {
    if !pattern.contains('%') {
        return None;
    }
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", datetime.format_with_items(items.iter())).ok()?;
    Some(out)
}

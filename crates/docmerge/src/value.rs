/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Data model value types.
//!
//! This module defines the values a document is merged against. A
//! [`DataModel`] maps root names to [`Value`]s; values nest as lists and maps.
//! JSON data converts directly (`From<serde_json::Value>`), with numbers split
//! into integers and floats.

use crate::error::{MergeError, MergeResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A value that can be substituted, tested or iterated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// A null/missing value.
    #[default]
    Null,

    Bool(bool),

    Integer(i64),

    Float(f64),

    String(String),

    Date(NaiveDate),

    DateTime(NaiveDateTime),

    /// An ordered list of values.
    List(Vec<Value>),

    /// A map of string keys to values.
    Map(HashMap<String, Value>),
}

impl Value {
    /// Check if this value is "truthy" for conditional evaluation.
    ///
    /// - Booleans are themselves
    /// - Strings are truthy when non-empty (even "false")
    /// - Numbers are truthy when non-zero
    /// - Lists and maps are truthy when non-empty
    /// - Dates are always truthy, null never is
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Date(_) | Value::DateTime(_) => true,
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Null => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a field of a map value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(name),
            _ => None,
        }
    }

    /// Look up an element of a list value.
    pub fn element(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            _ => None,
        }
    }

    /// Numeric view of the value, parsing numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Date-time view of the value; ISO-8601 strings are accepted.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => parse_iso_datetime(s),
            _ => None,
        }
    }

    /// Short type name, used in log output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Value equality with numeric, boolean and date coercion.
    ///
    /// Integers and floats compare numerically, numbers compare equal to
    /// numeric strings, booleans to `"true"`/`"false"` (case-insensitive) and
    /// dates to ISO-8601 strings.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
                s.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => self.loose_cmp(other) == Some(Ordering::Equal),
        }
    }

    /// Natural ordering of the value against another, if they are comparable.
    ///
    /// Numbers (and numeric strings against numbers), strings and dates are
    /// ordered; everything else is incomparable.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Float(_), _) | (_, Value::Integer(_) | Value::Float(_)) => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b)
            }
            (Value::Date(_) | Value::DateTime(_), _) | (_, Value::Date(_) | Value::DateTime(_)) => {
                let a = self.as_datetime()?;
                let b = other.as_datetime()?;
                Some(a.cmp(&b))
            }
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The root data a document is merged against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataModel {
    roots: HashMap<String, Value>,
}

impl DataModel {
    /// Create a new empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.roots.insert(key.into(), value.into());
        self
    }

    /// Get a root value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.roots.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Build a data model from a JSON object.
    ///
    /// # Errors
    /// Fails if `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> MergeResult<Self> {
        match json {
            serde_json::Value::Object(fields) => Ok(fields.into_iter().collect()),
            other => Err(MergeError::Config {
                message: format!(
                    "data model must be a JSON object, found {}",
                    Value::from(other).type_name()
                ),
            }),
        }
    }

    /// Parse a data model from JSON text.
    pub fn from_json_str(text: &str) -> MergeResult<Self> {
        Self::from_json(serde_json::from_str(text)?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataModel {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            roots: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Property paths over nested data.
//!
//! A path is a sequence of segments written with dots and brackets:
//! `Customer.Address.City`, `Items[0].Name`, `Prices["net"]`. Paths are parsed
//! once and then navigated over [`Value`]s; navigation never fails, a missing
//! field or out-of-range index simply yields `None`.

use crate::error::{MergeError, MergeResult};
use crate::value::Value;
use std::fmt;

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.Name` (or the leading name).
    Field(String),
    /// `[3]`
    Index(usize),
    /// `[key]`, `["key"]` or `['key']`
    Key(String),
}

/// A parsed property path with at least one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Parse path text.
    ///
    /// # Errors
    /// Empty paths, empty segments (`a..b`, `a.`, `.a`), unmatched brackets
    /// and empty indexers are rejected.
    pub fn parse(text: &str) -> MergeResult<Self> {
        let invalid = |message: &str| MergeError::InvalidPath {
            path: text.to_string(),
            message: message.to_string(),
        };

        let mut segments = Vec::new();
        let mut chars = text.trim().chars().peekable();
        let mut field = String::new();
        // True right after a '.', where a field name must follow.
        let mut expect_field = true;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if field.is_empty() && expect_field {
                        return Err(invalid("empty segment"));
                    }
                    if !field.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut field)));
                    }
                    expect_field = true;
                }
                '[' => {
                    if !field.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut field)));
                    } else if expect_field {
                        return Err(invalid("indexer must follow a name"));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        if c == '[' {
                            return Err(invalid("nested '['"));
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(invalid("unmatched '['"));
                    }
                    segments.push(parse_indexer(inner.trim()).ok_or_else(|| invalid("empty indexer"))?);
                    expect_field = false;
                    // After ']' only '.', '[' or the end may follow.
                    if let Some(next) = chars.peek() {
                        if *next != '.' && *next != '[' {
                            return Err(invalid("expected '.' or '[' after ']'"));
                        }
                    }
                }
                ']' => return Err(invalid("unmatched ']'")),
                c => {
                    field.push(c);
                    expect_field = false;
                }
            }
        }

        if !field.is_empty() {
            segments.push(PathSegment::Field(field));
        } else if expect_field {
            return Err(invalid("empty segment"));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The leading segment's name, when the path starts with a field.
    pub fn root_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Field(name)) => Some(name),
            _ => None,
        }
    }

    /// Navigate every segment starting at `value`.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        resolve_segments(value, &self.segments)
    }

    /// Navigate every segment after the first, starting at `value`.
    ///
    /// Used when the first segment has already been resolved by a context.
    pub fn resolve_tail<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        resolve_segments(value, self.segments.get(1..).unwrap_or_default())
    }
}

fn parse_indexer(inner: &str) -> Option<PathSegment> {
    if inner.is_empty() {
        return None;
    }
    if let Ok(index) = inner.parse::<usize>() {
        return Some(PathSegment::Index(index));
    }
    let unquoted = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    Some(PathSegment::Key(unquoted.to_string()))
}

fn resolve_segments<'v>(value: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
    segments.iter().try_fold(value, |current, segment| match segment {
        PathSegment::Field(name) | PathSegment::Key(name) => current.field(name),
        PathSegment::Index(index) => match current {
            Value::List(_) => current.element(*index),
            // Maps keyed by numbers ("2024": ...) are reachable with [2024].
            _ => current.field(&index.to_string()),
        },
    })
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[\"{key}\"]")?,
            }
        }
        Ok(())
    }
}

/// Whether `text` needs path navigation rather than a plain name lookup.
pub fn is_compound(text: &str) -> bool {
    text.contains('.') || text.contains('[')
}

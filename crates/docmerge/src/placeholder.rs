/*
 * placeholder.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Placeholder recognition.
//!
//! A placeholder is `{{target}}` or `{{target:spec}}` where the target is a
//! name or property path, `.`/`this` for the current loop item, or a
//! parenthesized boolean expression. Block markers (`{{#if ...}}`,
//! `{{/foreach}}`, `{{else}}`) are never placeholders.

use crate::context::EvaluationContext;
use crate::error::MergeResult;
use crate::expression::Expression;
use crate::path::{PropertyPath, is_compound};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([^\s{}#/][^{}]*?)\s*\}\}").expect("placeholder pattern is valid")
});

/// What a placeholder refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A name or property path.
    Path(String),
    /// The current loop item (`.` or `this`).
    Current,
    /// A boolean expression; renders as `true`/`false` or through a boolean
    /// formatter.
    Expression(Expression),
}

/// A placeholder found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Byte span of the whole `{{...}}`.
    pub span: Range<usize>,
    /// Target text, used to name the placeholder in warnings.
    pub name: String,
    pub target: Target,
    pub spec: Option<String>,
}

impl Placeholder {
    /// Resolve the placeholder's value. `None` means nothing in the context
    /// chain knows the target.
    pub fn resolve<'c>(&self, ctx: &'c dyn EvaluationContext) -> Option<Cow<'c, Value>> {
        match &self.target {
            Target::Path(name) => ctx.resolve(name),
            Target::Current => ctx.resolve("."),
            Target::Expression(expr) => Some(Cow::Owned(Value::Bool(expr.evaluate(ctx)))),
        }
    }
}

/// Find all placeholders in `text`, in order.
///
/// # Errors
/// Malformed expressions and property paths are fatal.
pub fn find_placeholders(text: &str) -> MergeResult<Vec<Placeholder>> {
    if !text.contains("{{") {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if inner.as_str() == "else" {
            continue;
        }
        let (name, spec) = split_spec(inner.as_str());
        let target = parse_target(name)?;
        found.push(Placeholder {
            span: whole.range(),
            name: name.to_string(),
            target,
            spec: spec.map(str::to_string),
        });
    }
    Ok(found)
}

fn parse_target(name: &str) -> MergeResult<Target> {
    if name == "." || name == "this" {
        return Ok(Target::Current);
    }
    if let Some(expr) = Expression::parse(name)? {
        return Ok(Target::Expression(expr));
    }
    if is_compound(name) {
        PropertyPath::parse(name)?;
    }
    Ok(Target::Path(name.to_string()))
}

/// Split `target:spec` at the first colon outside parentheses, brackets and
/// quotes.
fn split_spec(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '\u{201C}') => quote = Some('\u{201D}'),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ':') if depth == 0 => {
                return (inner[..i].trim_end(), Some(inner[i + 1..].trim()));
            }
            _ => {}
        }
    }
    (inner, None)
}

/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Boolean expressions.
//!
//! Expressions appear in conditional predicates (`{{#if (A and B)}}`) and in
//! placeholders (`{{(Total > 100)}}`). Text is only parsed as an expression
//! when it starts with `(`; anything else is a plain variable reference.
//!
//! Evaluation is total: an unresolved variable is null, which is false as a
//! truth value and incomparable in ordering comparisons.

mod lexer;
mod parser;

pub use lexer::CompareOp;

use crate::context::EvaluationContext;
use crate::error::MergeResult;
use crate::value::Value;
use std::cmp::Ordering;

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Variable(String),
    Literal(Value),
}

impl Operand {
    fn value(&self, ctx: &dyn EvaluationContext) -> Value {
        match self {
            Operand::Variable(name) => ctx
                .resolve(name)
                .map(|v| v.into_owned())
                .unwrap_or(Value::Null),
            Operand::Literal(value) => value.clone(),
        }
    }
}

/// A parsed boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Truthiness of a variable.
    Variable(String),
    /// Truthiness of a literal (`(true)`).
    Literal(Value),
    Comparison {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    /// Parse expression text.
    ///
    /// Returns `Ok(None)` when the text does not start with `(`, in which case
    /// callers treat it as a plain variable reference.
    ///
    /// # Errors
    /// Returns [`crate::MergeError::Expression`] for malformed text.
    pub fn parse(text: &str) -> MergeResult<Option<Expression>> {
        let text = text.trim();
        if !text.starts_with('(') {
            return Ok(None);
        }
        let tokens = lexer::tokenize(text)?;
        parser::Parser::new(&tokens, text).parse().map(Some)
    }

    /// Evaluate against a context.
    pub fn evaluate(&self, ctx: &dyn EvaluationContext) -> bool {
        match self {
            Expression::Variable(name) => ctx.resolve(name).is_some_and(|v| v.is_truthy()),
            Expression::Literal(value) => value.is_truthy(),
            Expression::Comparison { left, op, right } => {
                compare(&left.value(ctx), *op, &right.value(ctx))
            }
            Expression::And(a, b) => a.evaluate(ctx) && b.evaluate(ctx),
            Expression::Or(a, b) => a.evaluate(ctx) || b.evaluate(ctx),
            Expression::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::NotEq => !left.loose_eq(right),
        // Incomparable operands are "not ordered": never greater or less,
        // but they do satisfy the inclusive operators.
        CompareOp::Gt => left.loose_cmp(right) == Some(Ordering::Greater),
        CompareOp::Lt => left.loose_cmp(right) == Some(Ordering::Less),
        CompareOp::GtEq => left.loose_cmp(right) != Some(Ordering::Less),
        CompareOp::LtEq => left.loose_cmp(right) != Some(Ordering::Greater),
    }
}

/// A conditional predicate: an expression or a bare variable reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Expression(Expression),
    Variable(String),
}

impl Predicate {
    /// Parse predicate text from an `{{#if}}` / `{{#elseif}}` marker.
    ///
    /// Unparenthesized text that uses operators or keywords
    /// (`Count > 0`, `not Archived`) is read as if it were parenthesized.
    pub fn parse(text: &str) -> MergeResult<Predicate> {
        let text = text.trim();
        if let Some(expr) = Expression::parse(text)? {
            return Ok(Predicate::Expression(expr));
        }
        if needs_parentheses(text) {
            if let Some(expr) = Expression::parse(&format!("({text})"))? {
                return Ok(Predicate::Expression(expr));
            }
        }
        Ok(Predicate::Variable(text.to_string()))
    }

    pub fn evaluate(&self, ctx: &dyn EvaluationContext) -> bool {
        match self {
            Predicate::Expression(expr) => expr.evaluate(ctx),
            Predicate::Variable(name) => ctx.resolve(name).is_some_and(|v| v.is_truthy()),
        }
    }
}

fn needs_parentheses(text: &str) -> bool {
    text.contains(['=', '<', '>', '"', '\''])
        || text
            .split_whitespace()
            .any(|word| matches!(word.to_ascii_lowercase().as_str(), "and" | "or" | "not"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GlobalContext;
    use crate::value::DataModel;

    fn eval(text: &str, data: &DataModel) -> bool {
        let expr = Expression::parse(text).unwrap().expect("expression");
        expr.evaluate(&GlobalContext::new(data))
    }

    fn bools(a: bool, b: bool, c: bool) -> DataModel {
        [("a", a), ("b", b), ("c", c)].into_iter().collect()
    }

    #[test]
    fn test_not_parenthesized_is_not_an_expression() {
        assert_eq!(Expression::parse("IsActive").unwrap(), None);
        assert_eq!(Expression::parse("  IsActive ").unwrap(), None);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        for bits in 0..8u8 {
            let (a, b, c) = (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let data = bools(a, b, c);
            assert_eq!(
                eval("(a or b and c)", &data),
                eval("(a or (b and c))", &data),
                "a={a} b={b} c={c}"
            );
            assert_eq!(eval("(a or b and c)", &data), a || (b && c));
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let data = bools(true, false, false);
        assert!(!eval("((a or b) and c)", &data));
        assert!(eval("(a or b and c)", &data));
    }

    #[test]
    fn test_not_and_case_insensitive_keywords() {
        let data = bools(true, false, true);
        assert!(eval("(NOT b)", &data));
        assert!(eval("(a AND Not b)", &data));
        assert!(!eval("(not a == true)", &data));
    }

    #[test]
    fn test_comparisons() {
        let data = DataModel::from_json(serde_json::json!({
            "Count": 12,
            "Price": 9.5,
            "Status": "Active",
            "Flag": true,
            "Nothing": null,
        }))
        .unwrap();

        assert!(eval("(Count > 10)", &data));
        assert!(eval("(Count >= 12)", &data));
        assert!(!eval("(Count < 12)", &data));
        assert!(eval("(Count <= 12.0)", &data));
        assert!(eval("(Price < 10)", &data));
        assert!(eval("(Status == \"Active\")", &data));
        assert!(eval("(Status = 'Active')", &data));
        assert!(eval("(Status != \"Closed\")", &data));
        assert!(eval("(Flag == true)", &data));
        assert!(eval("(Nothing == null)", &data));
        assert!(eval("(Count == Count)", &data));
    }

    #[test]
    fn test_unresolved_and_incomparable_never_fail() {
        let data = DataModel::from_json(serde_json::json!({ "Status": "Active" })).unwrap();

        assert!(!eval("(Missing)", &data));
        assert!(eval("(not Missing)", &data));
        assert!(!eval("(Missing == 5)", &data));
        assert!(eval("(Missing == null)", &data));
        assert!(!eval("(Missing > 5)", &data));
        assert!(!eval("(Missing < 5)", &data));
        assert!(!eval("(Status > 5)", &data));
        assert!(!eval("(Status < 5)", &data));
        // Not ordered counts as equal for the inclusive operators.
        assert!(eval("(Status >= 5)", &data));
    }

    #[test]
    fn test_malformed_expressions_are_errors() {
        for text in ["(a and)", "(a > )", "((a)", "(a) b", "(== 3)"] {
            assert!(Expression::parse(text).is_err(), "expected error for {text}");
        }
    }

    #[test]
    fn test_predicate_forms() {
        let data = DataModel::from_json(serde_json::json!({ "Count": 3, "Archived": false }))
            .unwrap();
        let ctx = GlobalContext::new(&data);

        assert_eq!(
            Predicate::parse("Count").unwrap(),
            Predicate::Variable("Count".to_string())
        );
        assert!(Predicate::parse("Count").unwrap().evaluate(&ctx));
        assert!(Predicate::parse("Count > 2").unwrap().evaluate(&ctx));
        assert!(Predicate::parse("not Archived").unwrap().evaluate(&ctx));
        assert!(!Predicate::parse("(Count > 5)").unwrap().evaluate(&ctx));
    }
}

/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive-descent parser for boolean expressions.
//!
//! Precedence, loosest first: `or` -> `and` -> `not` -> primary, where a
//! primary is a parenthesized expression, a comparison or a variable.

use super::lexer::Token;
use super::{Expression, Operand};
use crate::error::{MergeError, MergeResult};
use crate::value::Value;

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    source: &'t str,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token], source: &'t str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    /// Parse the whole token stream.
    pub(crate) fn parse(mut self) -> MergeResult<Expression> {
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(self.error(format!("unexpected {token:?} after expression"))),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: String) -> MergeError {
        MergeError::Expression {
            expression: self.source.to_string(),
            message,
        }
    }

    fn parse_or(&mut self) -> MergeResult<Expression> {
        let mut left = self.parse_and()?;
        while self.consume(&Token::Or) {
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> MergeResult<Expression> {
        let mut left = self.parse_unary()?;
        while self.consume(&Token::And) {
            let right = self.parse_unary()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> MergeResult<Expression> {
        if self.consume(&Token::Not) {
            let inner = self.parse_unary()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> MergeResult<Expression> {
        if self.consume(&Token::LParen) {
            let inner = self.parse_or()?;
            if !self.consume(&Token::RParen) {
                return Err(self.error("expected ')'".to_string()));
            }
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        if let Some(Token::Op(op)) = self.peek() {
            self.pos += 1;
            let right = self.parse_operand()?;
            return Ok(Expression::Comparison {
                left,
                op: *op,
                right,
            });
        }

        match left {
            Operand::Variable(name) => Ok(Expression::Variable(name)),
            Operand::Literal(value) => Ok(Expression::Literal(value)),
        }
    }

    fn parse_operand(&mut self) -> MergeResult<Operand> {
        let operand = match self.next() {
            Some(Token::Ident(name)) => Operand::Variable(name.clone()),
            Some(Token::Str(s)) => Operand::Literal(Value::String(s.clone())),
            Some(Token::Number(n, true)) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Operand::Literal(Value::Integer(*n as i64))
            }
            Some(Token::Number(n, _)) => Operand::Literal(Value::Float(*n)),
            Some(Token::True) => Operand::Literal(Value::Bool(true)),
            Some(Token::False) => Operand::Literal(Value::Bool(false)),
            Some(Token::Null) => Operand::Literal(Value::Null),
            Some(token) => return Err(self.error(format!("expected a value, found {token:?}"))),
            None => return Err(self.error("unexpected end of expression".to_string())),
        };
        Ok(operand)
    }
}

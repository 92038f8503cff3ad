/*
 * lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for boolean expression text.

use crate::error::{MergeError, MergeResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Op(CompareOp),
    Number(f64, bool),
    Str(String),
    True,
    False,
    Null,
    /// Variable reference: a name, path, `.`/`this` or `@metadata`.
    Ident(String),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::GtEq => ">=",
            CompareOp::LtEq => "<=",
        }
    }
}

pub(crate) fn tokenize(text: &str) -> MergeResult<Vec<Token>> {
    let error = |message: String| MergeError::Expression {
        expression: text.to_string(),
        message,
    };

    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' | '!' | '<' | '>' => {
                let followed_by_eq = chars.get(i + 1) == Some(&'=');
                let op = match (c, followed_by_eq) {
                    ('=', _) => CompareOp::Eq,
                    ('!', true) => CompareOp::NotEq,
                    ('<', true) => CompareOp::LtEq,
                    ('>', true) => CompareOp::GtEq,
                    ('<', false) => CompareOp::Lt,
                    ('>', false) => CompareOp::Gt,
                    _ => return Err(error("'!' must be followed by '='".to_string())),
                };
                tokens.push(Token::Op(op));
                i += if followed_by_eq { 2 } else { 1 };
            }
            '"' | '\'' | '\u{201C}' | '\u{2018}' => {
                let closing: &[char] = match c {
                    '"' => &['"'],
                    '\'' => &['\''],
                    // Word processors replace straight quotes with typographic ones.
                    '\u{201C}' => &['\u{201D}', '\u{201C}'],
                    _ => &['\u{2019}', '\u{2018}'],
                };
                let start = i + 1;
                let end = (start..chars.len())
                    .find(|&j| closing.contains(&chars[j]))
                    .ok_or_else(|| error("unterminated string".to_string()))?;
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| error(format!("invalid number '{literal}'")))?;
                tokens.push(Token::Number(number, !literal.contains('.')));
            }
            c if is_ident_char(c) || c == '@' => {
                let start = i;
                while i < chars.len() && (is_ident_char(chars[i]) || path_char(chars[i])) {
                    i += 1;
                }
                // `@index` style names
                if i == start {
                    i += 1;
                    while i < chars.len() && is_ident_char(chars[i]) {
                        i += 1;
                    }
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(keyword(&word).unwrap_or(Token::Ident(word)));
            }
            '.' => {
                // `.` alone refers to the current loop item; `.Name` is not a path.
                tokens.push(Token::Ident(".".to_string()));
                i += 1;
            }
            other => return Err(error(format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters that may continue a path after its first character.
fn path_char(c: char) -> bool {
    matches!(c, '.' | '[' | ']' | '-')
}

fn keyword(word: &str) -> Option<Token> {
    let token = match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_comparison() {
        let tokens = tokenize(r#"(Status == "Active" AND Count >= 10)"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Ident("Status".to_string()),
                Token::Op(CompareOp::Eq),
                Token::Str("Active".to_string()),
                Token::And,
                Token::Ident("Count".to_string()),
                Token::Op(CompareOp::GtEq),
                Token::Number(10.0, true),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_paths_and_metadata() {
        let tokens = tokenize("(Items[0].Price > -1.5 or not @first)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Ident("Items[0].Price".to_string()),
                Token::Op(CompareOp::Gt),
                Token::Number(-1.5, false),
                Token::Or,
                Token::Not,
                Token::Ident("@first".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_single_equals_and_smart_quotes() {
        let tokens = tokenize("(Name = \u{201C}Bob\u{201D})").unwrap();
        assert_eq!(tokens[2], Token::Op(CompareOp::Eq));
        assert_eq!(tokens[3], Token::Str("Bob".to_string()));
    }

    #[test]
    fn test_errors() {
        assert!(tokenize("(a ! b)").is_err());
        assert!(tokenize("(a == \"open)").is_err());
        assert!(tokenize("(a # b)").is_err());
    }
}

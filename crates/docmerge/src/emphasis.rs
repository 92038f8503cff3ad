/*
 * emphasis.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Inline emphasis markup in substituted values.
//!
//! String values may carry lightweight emphasis: `***both***`, `**bold**`,
//! `*italic*` and `~~strike~~`, nested freely. A backslash escapes a
//! delimiter character. Delimiters without a partner are kept as literal
//! text, so `2 * 3` survives unchanged.

/// A piece of text with the emphasis that applies to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Bold,
    Italic,
    Strike,
}

impl Style {
    fn literal(self) -> &'static str {
        match self {
            Style::Bold => "**",
            Style::Italic => "*",
            Style::Strike => "~~",
        }
    }
}

/// `***` carries two styles; each may pair on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Delim(Vec<Style>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Literal,
    Open,
    Close,
}

/// Whether `text` may contain emphasis markup or escapes.
pub fn has_markup(text: &str) -> bool {
    text.contains('*') || text.contains("~~") || text.contains('\\')
}

fn flush(tokens: &mut Vec<Token>, literal: &mut String) {
    if !literal.is_empty() {
        tokens.push(Token::Text(std::mem::take(literal)));
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('*' | '~' | '\\')) => {
                if let Some(escaped) = chars.next() {
                    literal.push(escaped);
                }
            }
            '*' => {
                let mut stars = 1;
                while stars < 3 && chars.peek() == Some(&'*') {
                    chars.next();
                    stars += 1;
                }
                flush(&mut tokens, &mut literal);
                tokens.push(Token::Delim(match stars {
                    3 => vec![Style::Bold, Style::Italic],
                    2 => vec![Style::Bold],
                    _ => vec![Style::Italic],
                }));
            }
            '~' if chars.peek() == Some(&'~') => {
                chars.next();
                flush(&mut tokens, &mut literal);
                tokens.push(Token::Delim(vec![Style::Strike]));
            }
            other => literal.push(other),
        }
    }
    flush(&mut tokens, &mut literal);
    tokens
}

/// The role of each style of each delimiter token.
///
/// A style closes the innermost open style of the same kind. A `***` opener
/// may be closed by `**` and `*` separately, and a `***` closer may close an
/// open `**` and `*` together.
fn pair_delimiters(tokens: &[Token]) -> Vec<Vec<Role>> {
    let mut roles: Vec<Vec<Role>> = tokens
        .iter()
        .map(|token| match token {
            Token::Text(_) => Vec::new(),
            Token::Delim(styles) => vec![Role::Literal; styles.len()],
        })
        .collect();
    // (token, part, style) of every open style, innermost last.
    let mut open: Vec<(usize, usize, Style)> = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        let Token::Delim(styles) = token else {
            continue;
        };
        let innermost = |style: Style, open: &[(usize, usize, Style)]| {
            open.iter().rposition(|(_, _, s)| *s == style)
        };
        let mut parts: Vec<(usize, Style)> = styles.iter().copied().enumerate().collect();
        parts.sort_by_key(|(_, style)| {
            std::cmp::Reverse(innermost(*style, open.as_slice()))
        });

        let mut opening = Vec::new();
        for (part, style) in parts {
            match innermost(style, open.as_slice()) {
                Some(position) => {
                    let (opener, opener_part, _) = open[position];
                    roles[opener][opener_part] = Role::Open;
                    roles[index][part] = Role::Close;
                    // Openers crossed by this pair can no longer close, except
                    // the other half of a `***` opener.
                    let rest: Vec<_> = open
                        .drain(position..)
                        .skip(1)
                        .filter(|(token, _, _)| *token == opener)
                        .collect();
                    open.extend(rest);
                }
                None => opening.push((index, part, style)),
            }
        }
        opening.sort_by_key(|(_, part, _)| *part);
        open.extend(opening);
    }
    roles
}

/// Split text into emphasis segments.
///
/// Adjacent text with the same emphasis is merged; empty segments are
/// dropped.
pub fn split_emphasis(text: &str) -> Vec<Segment> {
    let tokens = tokenize(text);
    let roles = pair_delimiters(&tokens);

    let (mut bold, mut italic, mut strike) = (0u32, 0u32, 0u32);
    let mut segments: Vec<Segment> = Vec::new();
    let push = |segments: &mut Vec<Segment>, text: &str, bold: u32, italic: u32, strike: u32| {
        let (bold, italic, strike) = (bold > 0, italic > 0, strike > 0);
        match segments.last_mut() {
            Some(last) if (last.bold, last.italic, last.strike) == (bold, italic, strike) => {
                last.text.push_str(text);
            }
            _ if text.is_empty() => {}
            _ => segments.push(Segment {
                text: text.to_string(),
                bold,
                italic,
                strike,
            }),
        }
    };

    for (token, roles) in tokens.iter().zip(roles) {
        let styles = match token {
            Token::Text(s) => {
                push(&mut segments, s, bold, italic, strike);
                continue;
            }
            Token::Delim(styles) => styles,
        };
        // Closing halves first and opening halves last, so a literal half
        // sits outside the emphasis around it.
        let mut parts: Vec<(Style, Role)> = styles.iter().copied().zip(roles).collect();
        parts.sort_by_key(|(_, role)| match role {
            Role::Close => 0,
            Role::Literal => 1,
            Role::Open => 2,
        });
        for (style, role) in parts {
            if role == Role::Literal {
                push(&mut segments, style.literal(), bold, italic, strike);
                continue;
            }
            let counter = match style {
                Style::Bold => &mut bold,
                Style::Italic => &mut italic,
                Style::Strike => &mut strike,
            };
            if role == Role::Open {
                *counter += 1;
            } else {
                *counter = counter.saturating_sub(1);
            }
        }
    }
    segments
}

/*
 * markers.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lexing of block markers in flattened text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{\{\s*(?:(#if|#elseif|#foreach)\s+([^{}]*?)|(else|/if|/foreach|#empty))\s*\}\}",
    )
    .expect("marker pattern is valid")
});

/// The kind of a block marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    If,
    ElseIf,
    Else,
    EndIf,
    Foreach,
    Empty,
    EndForeach,
}

/// Where a marker sits within its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Open,
    Middle,
    Close,
}

impl MarkerKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "#if" => MarkerKind::If,
            "#elseif" => MarkerKind::ElseIf,
            "else" => MarkerKind::Else,
            "/if" => MarkerKind::EndIf,
            "#foreach" => MarkerKind::Foreach,
            "#empty" => MarkerKind::Empty,
            "/foreach" => MarkerKind::EndForeach,
            _ => return None,
        };
        Some(kind)
    }

    pub(crate) fn role(self) -> Role {
        match self {
            MarkerKind::If | MarkerKind::Foreach => Role::Open,
            MarkerKind::ElseIf | MarkerKind::Else | MarkerKind::Empty => Role::Middle,
            MarkerKind::EndIf | MarkerKind::EndForeach => Role::Close,
        }
    }

    /// The end marker matching an opening marker.
    pub(crate) fn closer(self) -> Option<MarkerKind> {
        match self {
            MarkerKind::If => Some(MarkerKind::EndIf),
            MarkerKind::Foreach => Some(MarkerKind::EndForeach),
            _ => None,
        }
    }
}

/// A block marker found in text, with its argument and span.
///
/// The span's unit depends on the level that produced the marker: byte
/// offsets within a paragraph's text, or then run, block or row indices once
/// the walker has mapped it onto a node sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Predicate or collection text; empty for markers without argument.
    pub argument: String,
    pub span: Range<usize>,
}

impl Marker {
    pub fn new(kind: MarkerKind, argument: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            argument: argument.into(),
            span,
        }
    }

    /// The same marker placed at another span.
    pub fn at(&self, span: Range<usize>) -> Self {
        Self {
            span,
            ..self.clone()
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MarkerKind::If => write!(f, "{{{{#if {}}}}}", self.argument),
            MarkerKind::ElseIf => write!(f, "{{{{#elseif {}}}}}", self.argument),
            MarkerKind::Else => write!(f, "{{{{else}}}}"),
            MarkerKind::EndIf => write!(f, "{{{{/if}}}}"),
            MarkerKind::Foreach => write!(f, "{{{{#foreach {}}}}}", self.argument),
            MarkerKind::Empty => write!(f, "{{{{#empty}}}}"),
            MarkerKind::EndForeach => write!(f, "{{{{/foreach}}}}"),
        }
    }
}

/// Find all block markers in `text`, in order, with byte spans.
pub fn lex_markers(text: &str) -> Vec<Marker> {
    if !text.contains("{{") {
        return Vec::new();
    }
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = caps.get(1).or_else(|| caps.get(3))?;
            let kind = MarkerKind::from_keyword(keyword.as_str())?;
            let argument = caps.get(2).map_or("", |m| m.as_str()).trim();
            Some(Marker::new(kind, argument, whole.range()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lex_all_kinds() {
        let text = "{{#if (A and B)}}x{{#elseif B}}y{{ else }}z{{/if}}\
                    {{#foreach Items}}{{#empty}}{{/foreach}}";
        let kinds: Vec<_> = lex_markers(text).into_iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::If,
                MarkerKind::ElseIf,
                MarkerKind::Else,
                MarkerKind::EndIf,
                MarkerKind::Foreach,
                MarkerKind::Empty,
                MarkerKind::EndForeach,
            ]
        );
    }

    #[test]
    fn test_lex_arguments_and_spans() {
        let text = "Hi {{#foreach line in Order.Lines }}!";
        let markers = lex_markers(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].argument, "line in Order.Lines");
        assert_eq!(&text[markers[0].span.clone()], "{{#foreach line in Order.Lines }}");
    }

    #[test]
    fn test_placeholders_are_not_markers() {
        assert!(lex_markers("{{Name}} {{#ifx}} {{elsewhere}} {{(a)}}").is_empty());
    }

    #[test]
    fn test_display_round_trips_marker_text() {
        let markers = lex_markers("{{#if Count > 1}}{{else}}{{/if}}");
        let shown: Vec<String> = markers.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["{{#if Count > 1}}", "{{else}}", "{{/if}}"]);
    }
}

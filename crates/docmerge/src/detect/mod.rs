/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Markup detection.
//!
//! Block markers are lexed from text ([`lex_markers`]) and paired into a
//! nesting tree of [`MarkupBlock`]s ([`pair_markers`]). The conditional and
//! loop detectors turn the top-level blocks of that tree into the descriptors
//! the visitors consume.
//!
//! Pairing is done in whatever index space the caller chooses: byte offsets
//! within a paragraph's text, run indices, block indices or row indices. A
//! descriptor's content span is the gap between two consecutive markers of
//! the block, in the same space.

pub mod conditional;
pub mod loops;
pub mod markers;

pub use conditional::{Branch, ConditionalBlock, ConditionalDetector};
pub use loops::{LoopBlock, LoopDetector};
pub use markers::{Marker, MarkerKind, lex_markers};

use crate::error::{MergeError, MergeResult};
use markers::Role;
use std::ops::Range;

/// The kind of node sequence markers are paired over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Runs of one paragraph.
    Inline,
    /// Sibling blocks; markers live in marker paragraphs.
    Block,
    /// Rows of one table; markers live in marker rows.
    Row,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Inline => "inline",
            Level::Block => "block",
            Level::Row => "row",
        }
    }
}

/// A balanced `{{#if}}...{{/if}}` or `{{#foreach}}...{{/foreach}}` block.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupBlock {
    pub open: Marker,
    /// `{{#elseif}}`, `{{else}}` or `{{#empty}}` markers, in order.
    pub middles: Vec<Marker>,
    pub close: Marker,
    pub children: Vec<MarkupBlock>,
}

impl MarkupBlock {
    pub fn kind(&self) -> MarkerKind {
        self.open.kind
    }

    /// Span from the start of the opening marker to the end of the closing one.
    pub fn span(&self) -> Range<usize> {
        self.open.span.start..self.close.span.end
    }

    /// The block's own markers, in order.
    pub fn delimiters(&self) -> impl Iterator<Item = &Marker> {
        std::iter::once(&self.open)
            .chain(self.middles.iter())
            .chain(std::iter::once(&self.close))
    }
}

/// Result of pairing a marker sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paired {
    /// Top-level blocks; nested blocks hang off their parents.
    pub blocks: Vec<MarkupBlock>,
    /// Markers that pair with something outside the sequence, in order.
    /// Always empty when pairing strictly.
    pub dangling: Vec<Marker>,
}

/// Whether markers may pair with something outside the paired sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Every marker must pair within the sequence.
    Strict,
    /// Unbalanced markers are reported in [`Paired::dangling`].
    AllowDangling,
}

struct Frame {
    open: Marker,
    middles: Vec<Marker>,
    children: Vec<MarkupBlock>,
}

/// Pair a marker sequence into nested blocks.
///
/// # Errors
/// Returns [`MergeError::Markup`] for misplaced `{{else}}`, `{{#elseif}}` or
/// `{{#empty}}` markers, mismatched end markers, and (when pairing strictly)
/// unmatched or unclosed markers.
pub fn pair_markers(markers: Vec<Marker>, pairing: Pairing) -> MergeResult<Paired> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut paired = Paired::default();

    for marker in markers {
        match marker.kind.role() {
            Role::Open => {
                if marker.argument.is_empty() {
                    return Err(MergeError::markup(format!("{marker} needs an argument")));
                }
                stack.push(Frame {
                    open: marker,
                    middles: Vec::new(),
                    children: Vec::new(),
                });
            }
            Role::Middle => match stack.last_mut() {
                Some(frame) => {
                    check_middle(frame, &marker)?;
                    frame.middles.push(marker);
                }
                None if pairing == Pairing::AllowDangling => paired.dangling.push(marker),
                None => return Err(outside_error(&marker)),
            },
            Role::Close => match stack.pop() {
                Some(frame) if frame.open.kind.closer() == Some(marker.kind) => {
                    let block = MarkupBlock {
                        open: frame.open,
                        middles: frame.middles,
                        close: marker,
                        children: frame.children,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(block),
                        None => paired.blocks.push(block),
                    }
                }
                Some(frame) => {
                    return Err(MergeError::markup(format!(
                        "{marker} does not close {}",
                        frame.open
                    )));
                }
                None if pairing == Pairing::AllowDangling => paired.dangling.push(marker),
                None => {
                    return Err(MergeError::markup(format!(
                        "{marker} has no matching opening marker"
                    )));
                }
            },
        }
    }

    if let Some(frame) = stack.first() {
        if pairing == Pairing::Strict {
            return Err(MergeError::markup(format!("{} is never closed", frame.open)));
        }
    }
    // Children of an unclosed opener stay in the node's text and pair again
    // once the opener is split away from them.
    for frame in stack {
        paired.dangling.push(frame.open);
        paired.dangling.extend(frame.middles);
    }
    paired.dangling.sort_by_key(|m| m.span.start);

    Ok(paired)
}

fn check_middle(frame: &Frame, marker: &Marker) -> MergeResult<()> {
    let after_else = frame.middles.iter().any(|m| m.kind == MarkerKind::Else);
    match marker.kind {
        MarkerKind::ElseIf | MarkerKind::Else => {
            if frame.open.kind != MarkerKind::If {
                return Err(MergeError::markup(format!(
                    "{marker} inside {}; only {{{{#if}}}} blocks take branches",
                    frame.open
                )));
            }
            if after_else {
                return Err(MergeError::markup(format!(
                    "{marker} after {{{{else}}}} in {}",
                    frame.open
                )));
            }
            if marker.kind == MarkerKind::ElseIf && marker.argument.is_empty() {
                return Err(MergeError::markup(format!("{marker} needs a predicate")));
            }
        }
        MarkerKind::Empty => {
            if frame.open.kind != MarkerKind::Foreach {
                return Err(MergeError::markup(format!(
                    "{marker} inside {}; it belongs to {{{{#foreach}}}}",
                    frame.open
                )));
            }
            if !frame.middles.is_empty() {
                return Err(MergeError::markup(format!(
                    "{marker} appears twice in {}",
                    frame.open
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

fn outside_error(marker: &Marker) -> MergeError {
    let owner = if marker.kind == MarkerKind::Empty {
        "{{#foreach}}"
    } else {
        "{{#if}}"
    };
    MergeError::markup(format!("{marker} outside of an {owner} block"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(text: &str, pairing: Pairing) -> MergeResult<Paired> {
        pair_markers(lex_markers(text), pairing)
    }

    #[test]
    fn test_nested_blocks() {
        let paired = pair(
            "{{#foreach A}}{{#if x}}1{{else}}2{{/if}}{{/foreach}}{{#if y}}{{/if}}",
            Pairing::Strict,
        )
        .unwrap();
        assert_eq!(paired.blocks.len(), 2);
        assert!(paired.dangling.is_empty());

        let outer = &paired.blocks[0];
        assert_eq!(outer.kind(), MarkerKind::Foreach);
        assert_eq!(outer.children.len(), 1);
        assert_eq!(outer.children[0].middles.len(), 1);
        assert_eq!(paired.blocks[1].kind(), MarkerKind::If);
    }

    #[test]
    fn test_span_and_delimiters() {
        let text = "a{{#if x}}b{{/if}}c";
        let paired = pair(text, Pairing::Strict).unwrap();
        let block = &paired.blocks[0];
        assert_eq!(&text[block.span()], "{{#if x}}b{{/if}}");
        assert_eq!(block.delimiters().count(), 2);
    }

    #[test]
    fn test_dangling_markers() {
        let paired = pair("{{/if}}x{{#if a}}{{/if}}{{#foreach B}}", Pairing::AllowDangling)
            .unwrap();
        let kinds: Vec<_> = paired.dangling.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::EndIf, MarkerKind::Foreach]);
        assert_eq!(paired.blocks.len(), 1);

        let paired = pair("{{else}}", Pairing::AllowDangling).unwrap();
        assert_eq!(paired.dangling[0].kind, MarkerKind::Else);
    }

    #[test]
    fn test_strict_errors() {
        let cases = [
            "{{else}}",
            "{{#elseif a}}",
            "{{#if a}}{{else}}{{#elseif b}}{{/if}}",
            "{{#if a}}{{else}}{{else}}{{/if}}",
            "{{#foreach A}}{{else}}{{/foreach}}",
            "{{#if a}}{{#empty}}{{/if}}",
            "{{#foreach A}}{{#empty}}{{#empty}}{{/foreach}}",
            "{{#empty}}",
            "{{#if a}}{{/foreach}}",
            "{{/if}}",
            "{{#if a}}",
            "{{#foreach A}}{{#if b}}{{/foreach}}{{/if}}",
        ];
        for text in cases {
            let result = pair(text, Pairing::Strict);
            assert!(
                matches!(result, Err(MergeError::Markup { .. })),
                "expected markup error for {text}"
            );
        }
    }

    #[test]
    fn test_misplaced_else_is_an_error_even_when_dangling_is_allowed() {
        assert!(pair("{{#foreach A}}{{else}}", Pairing::AllowDangling).is_err());
        assert!(pair("{{#if a}}{{#empty}}", Pairing::AllowDangling).is_err());
    }

    #[test]
    fn test_error_message_names_the_marker() {
        let err = pair("{{#if Ready}}", Pairing::Strict).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Markup error: {{#if Ready}} is never closed"
        );
    }
}

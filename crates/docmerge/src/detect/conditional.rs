/*
 * conditional.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::{MarkerKind, MarkupBlock};
use std::ops::Range;

/// One branch of a conditional block.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Predicate text; `None` for the `{{else}}` branch.
    pub predicate: Option<String>,
    pub content: Range<usize>,
}

/// A resolved `{{#if}}` block: its full span and its branches in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub span: Range<usize>,
    pub branches: Vec<Branch>,
}

impl ConditionalBlock {
    /// Build the descriptor for a paired `{{#if}}` block.
    pub fn from_markup(block: &MarkupBlock) -> Option<Self> {
        if block.kind() != MarkerKind::If {
            return None;
        }
        let delimiters: Vec<_> = block.delimiters().collect();
        let branches = delimiters
            .windows(2)
            .map(|pair| Branch {
                predicate: match pair[0].kind {
                    MarkerKind::Else => None,
                    _ => Some(pair[0].argument.clone()),
                },
                content: pair[0].span.end..pair[1].span.start,
            })
            .collect();
        Some(Self {
            span: block.span(),
            branches,
        })
    }
}

/// Picks the conditionals out of a region's top-level blocks.
pub struct ConditionalDetector;

impl ConditionalDetector {
    /// Top-level conditionals, in document order.
    pub fn detect(blocks: &[MarkupBlock]) -> Vec<ConditionalBlock> {
        blocks
            .iter()
            .filter_map(ConditionalBlock::from_markup)
            .collect()
    }
}

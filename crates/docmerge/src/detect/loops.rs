/*
 * loops.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::{Level, MarkerKind, MarkupBlock};
use crate::error::{MergeError, MergeResult};
use std::ops::Range;

/// A resolved `{{#foreach}}` block.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopBlock {
    pub span: Range<usize>,
    /// Collection name or property path.
    pub collection: String,
    /// Item alias from `{{#foreach alias in Collection}}`.
    pub alias: Option<String>,
    pub content: Range<usize>,
    /// Content of the `{{#empty}}` branch, if any.
    pub empty: Option<Range<usize>>,
    pub level: Level,
}

impl LoopBlock {
    /// Build the descriptor for a paired `{{#foreach}}` block.
    ///
    /// Returns `Ok(None)` for blocks of another kind.
    pub fn from_markup(block: &MarkupBlock, level: Level) -> MergeResult<Option<Self>> {
        if block.kind() != MarkerKind::Foreach {
            return Ok(None);
        }
        let (alias, collection) = parse_argument(&block.open.argument)?;

        let (content, empty) = match block.middles.first() {
            Some(empty) => (
                block.open.span.end..empty.span.start,
                Some(empty.span.end..block.close.span.start),
            ),
            None => (block.open.span.end..block.close.span.start, None),
        };

        Ok(Some(Self {
            span: block.span(),
            collection,
            alias,
            content,
            empty,
            level,
        }))
    }

    /// Whether the loop repeats table rows.
    pub fn is_row_level(&self) -> bool {
        self.level == Level::Row
    }
}

/// Split `alias in Collection` into its parts.
fn parse_argument(argument: &str) -> MergeResult<(Option<String>, String)> {
    let words: Vec<&str> = argument.split_whitespace().collect();
    match words.as_slice() {
        [collection] => Ok((None, (*collection).to_string())),
        [alias, "in", collection] if is_alias(alias) => {
            Ok((Some((*alias).to_string()), (*collection).to_string()))
        }
        _ => Err(MergeError::markup(format!(
            "invalid loop header '{argument}', expected 'Collection' or 'item in Collection'"
        ))),
    }
}

fn is_alias(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && word != "this"
}

/// Picks the loops out of a region's top-level blocks.
pub struct LoopDetector;

impl LoopDetector {
    /// Top-level loops, in document order.
    ///
    /// # Errors
    /// Fails on a malformed loop header.
    pub fn detect(blocks: &[MarkupBlock], level: Level) -> MergeResult<Vec<LoopBlock>> {
        let mut loops = Vec::new();
        for block in blocks {
            if let Some(found) = LoopBlock::from_markup(block, level)? {
                loops.push(found);
            }
        }
        Ok(loops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Pairing, lex_markers, pair_markers};
    use pretty_assertions::assert_eq;

    fn detect(text: &str) -> MergeResult<Vec<LoopBlock>> {
        let paired = pair_markers(lex_markers(text), Pairing::Strict)?;
        LoopDetector::detect(&paired.blocks, Level::Inline)
    }

    #[test]
    fn test_plain_loop() {
        let text = "{{#foreach Items}}[{{.}}]{{/foreach}}";
        let loops = detect(text).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].collection, "Items");
        assert_eq!(loops[0].alias, None);
        assert_eq!(&text[loops[0].content.clone()], "[{{.}}]");
        assert_eq!(loops[0].empty, None);
        assert!(!loops[0].is_row_level());
    }

    #[test]
    fn test_alias_and_empty_branch() {
        let text = "{{#foreach line in Order.Lines}}A{{#empty}}none{{/foreach}}";
        let loops = detect(text).unwrap();
        let found = &loops[0];
        assert_eq!(found.alias.as_deref(), Some("line"));
        assert_eq!(found.collection, "Order.Lines");
        assert_eq!(&text[found.content.clone()], "A");
        assert_eq!(found.empty.clone().map(|r| &text[r]), Some("none"));
    }

    #[test]
    fn test_malformed_headers() {
        assert!(detect("{{#foreach a b}}{{/foreach}}").is_err());
        assert!(detect("{{#foreach x of Items}}{{/foreach}}").is_err());
        assert!(detect("{{#foreach this in Items}}{{/foreach}}").is_err());
    }

    #[test]
    fn test_nested_loops_are_not_top_level() {
        let loops = detect("{{#foreach A}}{{#foreach B}}{{/foreach}}{{/foreach}}").unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].collection, "A");
    }
}

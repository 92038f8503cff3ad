/*
 * walker.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The document walker.
//!
//! A region is a sequence of sibling nodes scanned together: the blocks of a
//! body or table cell, the rows of a table, or the runs of a paragraph. Each
//! region goes through three phases:
//!
//! 1. **Conditionals**: scan, resolve every top-level conditional (last
//!    first, so earlier spans stay valid), and rescan until none are left.
//! 2. **Loops**: scan once and expand every top-level loop, last first.
//!    Expanded nodes were already processed under their iteration's context
//!    and are marked resolved.
//! 3. **Placeholders**: descend into the unresolved nodes. At run level,
//!    each maximal window of unresolved runs is handed to the visitor.
//!
//! Outer blocks are always resolved before their content, so content of a
//! discarded branch is never evaluated.

use crate::context::EvaluationContext;
use crate::detect::{
    ConditionalDetector, Level, LoopDetector, Marker, Pairing, lex_markers, pair_markers,
};
use crate::error::{MergeError, MergeResult};
use crate::pass::Pass;
use crate::runs::{RunMap, flatten, split_runs};
use crate::visitor::DocumentVisitor;
use docmerge_types::{Block, Paragraph, Row, Run};
use std::ops::Range;

/// A node type that can form a region.
pub trait RegionNode: Clone + Sized {
    const LEVEL: Level;

    /// Find the region's block markers, with spans in node indices.
    ///
    /// Implementations may restructure the region first (runs are split so
    /// that every marker covers whole runs).
    fn scan(nodes: &mut Vec<Self>) -> MergeResult<Vec<Marker>>;

    /// Resolve placeholders in every node not marked as resolved.
    fn finish<V: DocumentVisitor>(
        nodes: &mut Vec<Self>,
        resolved: &[bool],
        walker: &Walker<'_, V>,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<()>;
}

/// Drives a visitor over document regions.
pub struct Walker<'v, V> {
    visitor: &'v V,
}

impl<'v, V: DocumentVisitor> Walker<'v, V> {
    pub fn new(visitor: &'v V) -> Self {
        Self { visitor }
    }

    pub fn visitor(&self) -> &'v V {
        self.visitor
    }

    /// Process one region in place.
    pub fn walk<N: RegionNode>(
        &self,
        nodes: &mut Vec<N>,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<()> {
        loop {
            let markers = N::scan(nodes)?;
            if markers.is_empty() {
                break;
            }
            let paired = pair_markers(markers, Pairing::Strict)?;
            let conditionals = ConditionalDetector::detect(&paired.blocks);
            if conditionals.is_empty() {
                break;
            }
            tracing::debug!(
                region = N::LEVEL.name(),
                count = conditionals.len(),
                depth = scope.depth(),
                "Resolving conditionals"
            );
            let mut handled = false;
            for block in conditionals.iter().rev() {
                handled |= self.visitor.visit_conditional(nodes, block, scope, pass)?;
            }
            if !handled {
                break;
            }
        }

        let markers = N::scan(nodes)?;
        let mut resolved = vec![false; nodes.len()];
        if !markers.is_empty() {
            let paired = pair_markers(markers, Pairing::Strict)?;
            let loops = LoopDetector::detect(&paired.blocks, N::LEVEL)?;
            if !loops.is_empty() {
                tracing::debug!(
                    region = N::LEVEL.name(),
                    count = loops.len(),
                    depth = scope.depth(),
                    "Expanding loops"
                );
            }
            for block in loops.iter().rev() {
                let inserted = self
                    .visitor
                    .visit_loop(nodes, block, scope, pass)?
                    .unwrap_or(block.span.len());
                resolved.splice(block.span.clone(), std::iter::repeat_n(true, inserted));
            }
        }

        N::finish(nodes, &resolved, self, scope, pass)
    }
}

/// Markers of a paragraph that pair outside it.
fn block_dangling(block: &Block) -> MergeResult<Vec<Marker>> {
    match block {
        Block::Paragraph(paragraph) => {
            let markers = lex_markers(&paragraph.text());
            if markers.is_empty() {
                return Ok(Vec::new());
            }
            Ok(pair_markers(markers, Pairing::AllowDangling)?.dangling)
        }
        // Tables balance their own markup.
        Block::Table(_) | Block::Other(_) => Ok(Vec::new()),
    }
}

/// Markers of a block list that pair outside it.
fn blocks_dangling(blocks: &[Block]) -> MergeResult<Vec<Marker>> {
    let mut markers = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        markers.extend(
            block_dangling(block)?
                .into_iter()
                .map(|marker| marker.at(index..index + 1)),
        );
    }
    if markers.is_empty() {
        return Ok(markers);
    }
    Ok(pair_markers(markers, Pairing::AllowDangling)?.dangling)
}

/// Split a paragraph so that each of `markers` (which pair outside it) sits
/// in a paragraph of its own.
///
/// Text around the markers stays where it is, in paragraphs with the same
/// style; pieces holding only whitespace are dropped. `None` if the
/// paragraph holds a single marker and nothing else.
fn isolate_markers(paragraph: &Paragraph, markers: &[Marker]) -> MergeResult<Option<Vec<Block>>> {
    let text = paragraph.text();
    let mut pieces: Vec<(Range<usize>, bool)> = Vec::with_capacity(markers.len() * 2 + 1);
    let mut spans: Vec<&Range<usize>> = markers.iter().map(|marker| &marker.span).collect();
    spans.sort_by_key(|span| span.start);
    let mut cursor = 0;
    for span in spans {
        pieces.push((cursor..span.start, false));
        pieces.push((span.clone(), true));
        cursor = span.end;
    }
    pieces.push((cursor..text.len(), false));
    pieces.retain(|(span, is_marker)| *is_marker || !text[span.clone()].trim().is_empty());
    if pieces.len() == 1 {
        return Ok(None);
    }

    let mut runs = paragraph.runs.clone();
    runs.retain(|run| !run.is_empty());
    let cuts: Vec<usize> = pieces
        .iter()
        .flat_map(|(span, _)| [span.start, span.end])
        .collect();
    let runs = split_runs(runs, &cuts);
    let map = RunMap::new(&runs);
    pieces
        .into_iter()
        .map(|(span, _)| {
            let index_span = map.index_span(&span).ok_or_else(|| {
                MergeError::markup(format!(
                    "paragraph '{}' could not be split at its block markers",
                    excerpt(&text)
                ))
            })?;
            Ok(Block::Paragraph(Paragraph {
                style: paragraph.style.clone(),
                runs: runs[index_span].to_vec(),
            }))
        })
        .collect::<MergeResult<Vec<_>>>()
        .map(Some)
}

/// Text of a row outside its markers.
fn text_outside_markers(row: &Row) -> String {
    let text = row.plain_text();
    let mut rest = String::with_capacity(text.len());
    let mut cursor = 0;
    for marker in lex_markers(&text) {
        rest.push_str(&text[cursor..marker.span.start]);
        cursor = marker.span.end;
    }
    rest.push_str(&text[cursor..]);
    rest
}

fn single_marker(
    index: usize,
    mut markers: Vec<Marker>,
    describe: impl FnOnce() -> String,
) -> MergeResult<Option<Marker>> {
    match markers.len() {
        0 => Ok(None),
        1 => Ok(markers.pop().map(|marker| marker.at(index..index + 1))),
        _ => Err(MergeError::markup(format!(
            "{} holds {} block markers that pair outside it ({}); put each in a node of its own",
            describe(),
            markers.len(),
            markers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl RegionNode for Block {
    const LEVEL: Level = Level::Block;

    /// Paragraphs holding other text besides their block markers are split
    /// first, so that removing a marker paragraph removes only the marker.
    fn scan(nodes: &mut Vec<Self>) -> MergeResult<Vec<Marker>> {
        let mut found = Vec::new();
        let mut index = 0;
        while index < nodes.len() {
            let markers = block_dangling(&nodes[index])?;
            let pieces = match &nodes[index] {
                Block::Paragraph(paragraph) if !markers.is_empty() => {
                    isolate_markers(paragraph, &markers)?
                }
                _ => None,
            };
            if let Some(pieces) = pieces {
                tracing::trace!(index, pieces = pieces.len(), "Splitting marker paragraph");
                nodes.splice(index..index + 1, pieces);
                continue;
            }
            let block = &nodes[index];
            let describe = || format!("paragraph '{}'", excerpt(&block.plain_text()));
            found.extend(single_marker(index, markers, describe)?);
            index += 1;
        }
        Ok(found)
    }

    fn finish<V: DocumentVisitor>(
        nodes: &mut Vec<Self>,
        resolved: &[bool],
        walker: &Walker<'_, V>,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<()> {
        for (block, done) in nodes.iter_mut().zip(resolved) {
            if *done {
                continue;
            }
            match block {
                Block::Paragraph(paragraph) => walker.walk(&mut paragraph.runs, scope, pass)?,
                Block::Table(table) => walker.walk(&mut table.rows, scope, pass)?,
                Block::Other(_) => {}
            }
        }
        Ok(())
    }
}

impl RegionNode for Row {
    const LEVEL: Level = Level::Row;

    fn scan(nodes: &mut Vec<Self>) -> MergeResult<Vec<Marker>> {
        let mut found = Vec::new();
        for (index, row) in nodes.iter().enumerate() {
            let mut markers = Vec::new();
            for (column, cell) in row.cells.iter().enumerate() {
                markers.extend(
                    blocks_dangling(&cell.blocks)?
                        .into_iter()
                        .map(|marker| marker.at(column..column + 1)),
                );
            }
            if !markers.is_empty() {
                markers = pair_markers(markers, Pairing::AllowDangling)?.dangling;
            }
            // A marker row is removed whole, so it may hold nothing else.
            if !markers.is_empty() && !text_outside_markers(row).trim().is_empty() {
                return Err(MergeError::markup(format!(
                    "table row '{}' holds {} and other content; put the marker in a row of its own",
                    excerpt(&row.plain_text()),
                    markers[0]
                )));
            }
            let describe = || format!("table row '{}'", excerpt(&row.plain_text()));
            found.extend(single_marker(index, markers, describe)?);
        }
        Ok(found)
    }

    fn finish<V: DocumentVisitor>(
        nodes: &mut Vec<Self>,
        resolved: &[bool],
        walker: &Walker<'_, V>,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<()> {
        for (row, done) in nodes.iter_mut().zip(resolved) {
            if *done {
                continue;
            }
            for cell in &mut row.cells {
                walker.walk(&mut cell.blocks, scope, pass)?;
            }
        }
        Ok(())
    }
}

impl RegionNode for Run {
    const LEVEL: Level = Level::Inline;

    fn scan(nodes: &mut Vec<Self>) -> MergeResult<Vec<Marker>> {
        let markers = lex_markers(&flatten(nodes));
        if markers.is_empty() {
            return Ok(markers);
        }

        // Empty runs would make run boundaries ambiguous.
        nodes.retain(|run| !run.is_empty());
        let cuts: Vec<usize> = markers
            .iter()
            .flat_map(|marker| [marker.span.start, marker.span.end])
            .collect();
        let split = split_runs(std::mem::take(nodes), &cuts);
        *nodes = split;

        let map = RunMap::new(nodes);
        markers
            .into_iter()
            .map(|marker| {
                let span = map.index_span(&marker.span).ok_or_else(|| {
                    MergeError::markup(format!("{marker} could not be aligned with text runs"))
                })?;
                Ok(marker.at(span))
            })
            .collect()
    }

    fn finish<V: DocumentVisitor>(
        nodes: &mut Vec<Self>,
        resolved: &[bool],
        walker: &Walker<'_, V>,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<()> {
        for window in unresolved_windows(resolved).into_iter().rev() {
            if let Some(runs) = walker.visitor().visit_text(&nodes[window.clone()], scope, pass)? {
                nodes.splice(window, runs);
            }
        }
        Ok(())
    }
}

/// Maximal index ranges whose entries are all `false`.
fn unresolved_windows(resolved: &[bool]) -> Vec<Range<usize>> {
    let mut windows = Vec::new();
    let mut start = None;
    for (index, done) in resolved.iter().enumerate() {
        match (start, *done) {
            (None, false) => start = Some(index),
            (Some(from), true) => {
                windows.push(from..index);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(from) = start {
        windows.push(from..resolved.len());
    }
    windows
}

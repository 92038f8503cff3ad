/*
 * runs.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Run splitting and reconstruction.
//!
//! Markup is found in a paragraph's flattened text, but the paragraph is a
//! sequence of runs with their own formatting, and a single `{{Name}}` is
//! often spread over several of them. The helpers here translate between
//! byte offsets in the flattened text and run indices, and rebuild runs after
//! text edits while keeping every untouched character in its original run
//! formatting.

use docmerge_types::{Run, RunFormat};
use std::ops::Range;

/// Concatenated text of a run sequence.
pub fn flatten(runs: &[Run]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// Start offsets of each run in the flattened text.
#[derive(Debug, Clone)]
pub struct RunMap {
    starts: Vec<usize>,
    total: usize,
}

impl RunMap {
    pub fn new(runs: &[Run]) -> Self {
        let mut starts = Vec::with_capacity(runs.len());
        let mut offset = 0;
        for run in runs {
            starts.push(offset);
            offset += run.text.len();
        }
        Self {
            starts,
            total: offset,
        }
    }

    /// Index of the run that contains byte `offset`.
    ///
    /// Offsets at a boundary belong to the run that starts there; empty runs
    /// are skipped over.
    pub fn run_at(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Run index for an offset that falls on a run boundary.
    ///
    /// The end of the text maps to the number of runs.
    pub fn boundary(&self, offset: usize) -> Option<usize> {
        if offset == self.total {
            return Some(self.starts.len());
        }
        self.starts.binary_search(&offset).ok()
    }

    /// Map a byte span onto the run span that covers exactly the same text.
    pub fn index_span(&self, span: &Range<usize>) -> Option<Range<usize>> {
        Some(self.boundary(span.start)?..self.boundary(span.end)?)
    }
}

/// Split runs so that every offset in `cuts` falls on a run boundary.
///
/// Formatting is copied to both halves of a split run; text is unchanged.
pub fn split_runs(runs: Vec<Run>, cuts: &[usize]) -> Vec<Run> {
    let mut cuts = cuts.to_vec();
    cuts.sort_unstable();
    cuts.dedup();
    let mut cuts = cuts.into_iter().peekable();

    let mut out = Vec::with_capacity(runs.len() + cuts.len());
    let mut offset = 0;
    for run in runs {
        let end = offset + run.text.len();
        let mut local_start = 0;
        while let Some(&cut) = cuts.peek() {
            if cut <= offset {
                cuts.next();
                continue;
            }
            if cut >= end {
                break;
            }
            let local = cut - offset;
            out.push(Run::new(&run.text[local_start..local], run.format.clone()));
            local_start = local;
            cuts.next();
        }
        if local_start == 0 {
            out.push(run);
        } else {
            out.push(Run::new(&run.text[local_start..], run.format));
        }
        offset = end;
    }
    out
}

/// A replacement of a byte span of the flattened text by formatted runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub span: Range<usize>,
    pub runs: Vec<Run>,
}

impl Edit {
    /// Replace `span` with `text` in the given format.
    pub fn text(span: Range<usize>, text: impl Into<String>, format: RunFormat) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::new(text, format)]
        };
        Self { span, runs }
    }
}

struct Piece {
    run: Run,
    /// Run the piece came from, or the run its edit started in.
    origin: usize,
}

/// Apply non-overlapping edits, sorted by span start, to a run sequence.
///
/// Text outside the edits keeps its run and formatting. Adjacent pieces that
/// come from the same original run and share a format are merged back into
/// one run, so an edit inside a run leaves a single run behind when the
/// replacement carries the same formatting.
pub fn apply_edits(runs: &[Run], edits: &[Edit]) -> Vec<Run> {
    let map = RunMap::new(runs);
    let mut pieces: Vec<Piece> = Vec::new();
    let mut cursor = 0;

    let keep = |pieces: &mut Vec<Piece>, from: usize, to: usize| {
        for (index, run) in runs.iter().enumerate() {
            let start = map.starts[index];
            let end = start + run.text.len();
            let (a, b) = (from.max(start), to.min(end));
            if a < b {
                pieces.push(Piece {
                    run: Run::new(&run.text[a - start..b - start], run.format.clone()),
                    origin: index,
                });
            }
        }
    };

    for edit in edits {
        keep(&mut pieces, cursor, edit.span.start);
        let origin = map.run_at(edit.span.start);
        pieces.extend(edit.runs.iter().filter(|r| !r.is_empty()).map(|run| Piece {
            run: run.clone(),
            origin,
        }));
        cursor = cursor.max(edit.span.end);
    }
    keep(&mut pieces, cursor, map.total);

    let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match out.last_mut() {
            Some(last) if last.origin == piece.origin && last.run.format == piece.run.format => {
                last.run.text.push_str(&piece.run.text);
            }
            _ => out.push(piece),
        }
    }
    out.into_iter().map(|piece| piece.run).collect()
}

/// Replace every occurrence of `find` in the flattened text with `replace`.
///
/// Occurrences may span runs; the replacement takes the format of the run
/// the occurrence starts in. Returns `None` when nothing matched.
pub fn replace_text(runs: &[Run], find: &str, replace: &str) -> Option<Vec<Run>> {
    if find.is_empty() {
        return None;
    }
    let text = flatten(runs);
    let map = RunMap::new(runs);
    let edits: Vec<Edit> = text
        .match_indices(find)
        .map(|(start, matched)| {
            let format = runs[map.run_at(start)].format.clone();
            Edit::text(start..start + matched.len(), replace, format)
        })
        .collect();
    if edits.is_empty() {
        return None;
    }
    Some(apply_edits(runs, &edits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bold(text: &str) -> Run {
        Run::new(text, RunFormat::bold())
    }

    #[test]
    fn test_run_map() {
        let runs = vec![Run::plain("ab"), Run::plain(""), Run::plain("cde")];
        let map = RunMap::new(&runs);
        assert_eq!(map.run_at(0), 0);
        assert_eq!(map.run_at(1), 0);
        assert_eq!(map.run_at(2), 2);
        assert_eq!(map.boundary(5), Some(3));
        assert_eq!(map.boundary(3), None);
    }

    #[test]
    fn test_split_runs_at_cuts() {
        let runs = vec![Run::plain("Hello {{#if"), bold(" A}}x")];
        let split = split_runs(runs, &[6, 15, 6, 0]);
        assert_eq!(
            split,
            vec![
                Run::plain("Hello "),
                Run::plain("{{#if"),
                bold(" A}}"),
                bold("x"),
            ]
        );
        let map = RunMap::new(&split);
        assert_eq!(map.index_span(&(6..15)), Some(1..3));
    }

    #[test]
    fn test_apply_edit_inside_one_run_keeps_a_single_run() {
        let runs = vec![Run::plain("Hello {{Name}}!")];
        let edits = vec![Edit::text(6..14, "Bob", RunFormat::default())];
        assert_eq!(apply_edits(&runs, &edits), vec![Run::plain("Hello Bob!")]);
    }

    #[test]
    fn test_apply_edit_across_runs() {
        let runs = vec![Run::plain("Dear {{Na"), bold("me}}"), Run::plain(",")];
        let edits = vec![Edit::text(5..13, "Ann", RunFormat::default())];
        assert_eq!(
            apply_edits(&runs, &edits),
            vec![Run::plain("Dear Ann"), Run::plain(",")]
        );
    }

    #[test]
    fn test_untouched_runs_keep_their_boundaries() {
        let runs = vec![Run::plain("a"), Run::plain("b"), bold("c")];
        assert_eq!(apply_edits(&runs, &[]), runs);
    }

    #[test]
    fn test_replace_text_spans_runs() {
        let runs = vec![Run::plain("Cop"), bold("yright (c) 20"), Run::plain("25")];
        let replaced = replace_text(&runs, "(c)", "\u{a9}").unwrap();
        assert_eq!(flatten(&replaced), "Copyright \u{a9} 2025");
        assert_eq!(replaced[1], bold("yright \u{a9} 20"));
        assert_eq!(replace_text(&runs, "zzz", "y"), None);
    }
}

/*
 * table.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::{Block, Blocks};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub blocks: Blocks,
}

impl Cell {
    pub fn new(blocks: Blocks) -> Self {
        Self { blocks }
    }

    /// A cell holding a single plain paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Block::text(text)])
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// A row of single-paragraph cells.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Cell::text).collect())
    }

    /// Cell texts joined by tabs.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(Cell::plain_text)
            .collect::<Vec<_>>()
            .join("\t")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { style: None, rows }
    }

    /// Row texts joined by newlines.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(Row::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

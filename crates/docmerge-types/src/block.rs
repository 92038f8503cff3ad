/*
 * block.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::inline::Run;
use crate::table::Table;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Anything the engine does not interpret (section breaks, images,
    /// fields, ...). Kept verbatim and cloned together with its siblings.
    Other(OtherBlock),
}

pub type Blocks = Vec<Block>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { style: None, runs }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherBlock {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Block {
    /// A paragraph with a single unformatted run.
    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph::new(vec![Run::plain(text)]))
    }

    pub fn paragraph(runs: Vec<Run>) -> Self {
        Block::Paragraph(Paragraph::new(runs))
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::Table(_) | Block::Other(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(table) => Some(table),
            Block::Paragraph(_) | Block::Other(_) => None,
        }
    }

    /// Plain text of the block, for diagnostics and tests.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(paragraph) => paragraph.text(),
            Block::Table(table) => table.plain_text(),
            Block::Other(_) => String::new(),
        }
    }
}

/// A whole document: the body plus header and footer parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub body: Blocks,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Blocks>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footers: Vec<Blocks>,
}

impl Document {
    pub fn new(body: Blocks) -> Self {
        Self {
            body,
            headers: Vec::new(),
            footers: Vec::new(),
        }
    }

    /// Body text, one line per top-level block.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every block list of the document: body, headers, footers.
    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut Blocks> {
        std::iter::once(&mut self.body)
            .chain(self.headers.iter_mut())
            .chain(self.footers.iter_mut())
    }
}

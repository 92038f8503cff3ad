/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Document tree type definitions for docmerge.
 *
 * This crate provides pure data type definitions for the word-processing
 * document tree that the docmerge engine walks and mutates. It has minimal
 * dependencies (serde, serde_json) so that document package readers and
 * writers can depend on it without pulling in the engine.
 */

pub mod block;
pub mod inline;
pub mod table;

// Re-export commonly used types at the crate root
pub use block::{Block, Blocks, Document, OtherBlock, Paragraph};
pub use inline::{Run, RunFormat};
pub use table::{Cell, Row, Table};

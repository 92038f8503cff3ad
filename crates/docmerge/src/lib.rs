/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Formatting-preserving template engine for word-processing documents.
//!
//! The engine resolves template markup written directly in a document tree
//! (see [`docmerge_types`]) against a data model, keeping the formatting of
//! every character it does not replace. It supports:
//!
//! - Placeholders: `{{Name}}`, `{{Customer.Address.City}}`, `{{Items[0]}}`
//! - Format specifiers: `{{Total:N2}}`, `{{Due:%d %B %Y}}`, `{{Paid:checkbox}}`
//! - Conditionals: `{{#if expr}}...{{#elseif expr}}...{{else}}...{{/if}}`
//! - Loops: `{{#foreach Items}}...{{#empty}}...{{/foreach}}`, with
//!   `{{#foreach item in Items}}` aliases and `@index`, `@first`, `@last`,
//!   `@count` metadata
//! - Boolean expressions: `(Count > 0 and not Archived)`
//! - Emphasis markup in substituted text: `**bold**`, `*italic*`, `~~strike~~`
//!
//! # Architecture
//!
//! Markup may appear inside a paragraph, or on paragraphs and table rows of
//! its own that enclose whole blocks or rows. The [`walker`] processes each
//! of these regions in three phases (conditionals, loops, placeholders)
//! through the visitors in [`visitor`]; loop bodies re-enter the full
//! pipeline under a scoped [`context::LoopContext`].
//!
//! Unresolved names are warnings, collected in the [`ProcessingResult`].
//! Malformed markup is a [`MergeError`] and leaves the document untouched.
//!
//! # Example
//!
//! ```ignore
//! use docmerge::{DataModel, DocumentProcessor};
//! use docmerge_types::{Block, Document};
//!
//! let data = DataModel::from_json(serde_json::json!({ "Name": "World" }))?;
//! let mut document = Document::new(vec![Block::text("Hello, {{Name}}!")]);
//!
//! let result = DocumentProcessor::default().process(&mut document, &data);
//! assert!(result.success);
//! assert_eq!(document.plain_text(), "Hello, World!");
//! ```

pub mod context;
pub mod detect;
pub mod emphasis;
pub mod engine;
pub mod error;
pub mod expression;
pub mod format;
pub mod options;
pub mod pass;
pub mod path;
pub mod placeholder;
pub mod report;
pub mod runs;
pub mod value;
pub mod visitor;
pub mod walker;

// Re-export main types at crate root
pub use context::{EvaluationContext, GlobalContext, LoopContext};
pub use engine::{DocumentProcessor, ProcessingResult};
pub use error::{MergeError, MergeResult};
pub use expression::{Expression, Predicate};
pub use format::{BooleanFormatter, BooleanFormatterRegistry, Locale, ValueFormatter};
pub use options::{MissingVariablePolicy, ProcessingConfig, ProcessingOptions, Replacement};
pub use pass::{ProcessingWarning, WarningKind};
pub use path::PropertyPath;
pub use report::warning_report;
pub use value::{DataModel, Value};

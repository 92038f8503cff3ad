/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The public entry point.

use crate::context::GlobalContext;
use crate::error::MergeResult;
use crate::options::{ProcessingOptions, Replacement};
use crate::pass::{Pass, ProcessingWarning};
use crate::runs::replace_text;
use crate::value::DataModel;
use crate::visitor::CompositeVisitor;
use crate::walker::Walker;
use docmerge_types::{Block, Blocks, Document};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one processing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessingResult {
    pub success: bool,
    /// Number of placeholders that were substituted with a value.
    pub replacement_count: usize,
    pub warnings: Vec<ProcessingWarning>,
    /// Message of the error that aborted the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Resolves template markup in document trees.
///
/// A processor holds only its options and the visitor pipeline, so it can be
/// shared across threads and reused for any number of documents.
pub struct DocumentProcessor {
    options: ProcessingOptions,
    pipeline: Arc<CompositeVisitor>,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(ProcessingOptions::default())
    }
}

impl DocumentProcessor {
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            options,
            pipeline: CompositeVisitor::build(),
        }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Process a document in place.
    ///
    /// Errors are reported through the result. On failure the document is
    /// left exactly as it was.
    pub fn process(&self, document: &mut Document, data: &DataModel) -> ProcessingResult {
        match self.try_process(document, data) {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(error = %err, "Processing failed");
                ProcessingResult::failed(err.to_string())
            }
        }
    }

    /// Process a bare block list in place.
    pub fn process_blocks(&self, blocks: &mut Blocks, data: &DataModel) -> ProcessingResult {
        let mut document = Document::new(std::mem::take(blocks));
        let result = self.process(&mut document, data);
        *blocks = document.body;
        result
    }

    /// Process a document in place, returning fatal problems as errors.
    ///
    /// The work is done on a copy that replaces `document` only on success.
    pub fn try_process(
        &self,
        document: &mut Document,
        data: &DataModel,
    ) -> MergeResult<ProcessingResult> {
        let mut working = document.clone();
        let mut pass = Pass::new(&self.options);
        let walker = Walker::new(self.pipeline.as_ref());
        let scope = GlobalContext::new(data);

        for blocks in working.parts_mut() {
            apply_replacements(blocks, &self.options.replacements);
            walker.walk(blocks, &scope, &mut pass)?;
        }

        *document = working;
        let result = ProcessingResult {
            success: true,
            replacement_count: pass.replacement_count,
            warnings: pass.warnings.into_warnings(),
            error: None,
        };
        tracing::debug!(
            replacements = result.replacement_count,
            warnings = result.warnings.len(),
            "Processing finished"
        );
        Ok(result)
    }
}

/// Apply literal substitutions to every paragraph, tables included.
fn apply_replacements(blocks: &mut [Block], replacements: &[Replacement]) {
    if replacements.is_empty() {
        return;
    }
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                for replacement in replacements {
                    if let Some(runs) =
                        replace_text(&paragraph.runs, &replacement.find, &replacement.replace)
                    {
                        paragraph.runs = runs;
                    }
                }
            }
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                    apply_replacements(&mut cell.blocks, replacements);
                }
            }
            Block::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmerge_types::{Row, Run, RunFormat, Table};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_processor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentProcessor>();
    }

    #[test]
    fn test_replacements_reach_table_cells() {
        let mut blocks = vec![
            Block::paragraph(vec![Run::plain("(c"), Run::new(") 2025", RunFormat::bold())]),
            Block::Table(Table::new(vec![Row::texts(["(c)"])])),
        ];
        let replacements = vec![Replacement {
            find: "(c)".to_string(),
            replace: "\u{a9}".to_string(),
        }];
        apply_replacements(&mut blocks, &replacements);
        assert_eq!(blocks[0].plain_text(), "\u{a9} 2025");
        assert_eq!(blocks[1].plain_text(), "\u{a9}");
    }

    #[test]
    fn test_headers_and_footers_are_processed() {
        let data: DataModel = [("Title", "Report")].into_iter().collect();
        let mut document = Document {
            body: vec![Block::text("{{Title}}")],
            headers: vec![vec![Block::text("Header: {{Title}}")]],
            footers: vec![vec![Block::text("Footer: {{Title}}")]],
        };
        let result = DocumentProcessor::default().process(&mut document, &data);
        assert!(result.success);
        assert_eq!(result.replacement_count, 3);
        assert_eq!(document.headers[0][0].plain_text(), "Header: Report");
        assert_eq!(document.footers[0][0].plain_text(), "Footer: Report");
    }

    #[test]
    fn test_failed_call_leaves_the_document_untouched() {
        let data: DataModel = [("Name", "Ann")].into_iter().collect();
        let mut document = Document::new(vec![
            Block::text("{{Name}}"),
            Block::text("{{#if A}}unclosed"),
        ]);
        let before = document.clone();
        let result = DocumentProcessor::default().process(&mut document, &data);
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.replacement_count, 0);
        assert_eq!(document, before);
    }

    #[test]
    fn test_process_blocks() {
        let data: DataModel = [("Name", "Ann")].into_iter().collect();
        let mut blocks = vec![Block::text("Hi {{Name}}")];
        let result = DocumentProcessor::default().process_blocks(&mut blocks, &data);
        assert!(result.success);
        assert_eq!(blocks, vec![Block::text("Hi Ann")]);
    }
}

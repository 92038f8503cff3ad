/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! A summary document for the warnings of a processing call.
//!
//! The report is itself a template rendered by [`DocumentProcessor`]: a title
//! with the warning count, then either a table with one row per warning or a
//! single paragraph saying there is nothing to report.

use crate::engine::DocumentProcessor;
use crate::error::{MergeError, MergeResult};
use crate::options::ProcessingOptions;
use crate::pass::ProcessingWarning;
use crate::value::DataModel;
use docmerge_types::{Block, Document, Row, Run, RunFormat, Table};

fn template() -> Document {
    Document::new(vec![
        Block::paragraph(vec![Run::new(
            "Processing warnings ({{Count}})",
            RunFormat::bold(),
        )]),
        Block::text("{{#if Warnings}}"),
        Block::Table(Table::new(vec![
            Row::texts(["Kind", "Name", "Message"]),
            Row::texts(["{{#foreach warning in Warnings}}"]),
            Row::texts(["{{warning.Kind}}", "{{warning.Name}}", "{{warning.Message}}"]),
            Row::texts(["{{/foreach}}"]),
        ])),
        Block::text("{{else}}"),
        Block::text("No warnings were recorded."),
        Block::text("{{/if}}"),
    ])
}

/// Render `warnings` into a new document.
///
/// # Errors
/// Fails only if the report template itself cannot be processed.
pub fn warning_report(warnings: &[ProcessingWarning]) -> MergeResult<Document> {
    let rows: Vec<serde_json::Value> = warnings
        .iter()
        .map(|warning| {
            serde_json::json!({
                "Kind": warning.kind.label(),
                "Name": warning.name,
                "Message": warning.message,
            })
        })
        .collect();
    let data = DataModel::from_json(serde_json::json!({
        "Count": warnings.len(),
        "Warnings": rows,
    }))?;

    // Warning text is shown as written.
    let options = ProcessingOptions::default().with_emphasis_markup(false);
    let mut document = template();
    let result = DocumentProcessor::new(options).try_process(&mut document, &data)?;
    if result.has_warnings() {
        return Err(MergeError::markup(format!(
            "warning report template left {} placeholders unresolved",
            result.warnings.len()
        )));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::WarningKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_lists_each_warning() {
        let warnings = vec![
            ProcessingWarning::new(WarningKind::MissingVariable, "Customer.Name"),
            ProcessingWarning::new(WarningKind::NullCollection, "Orders"),
        ];
        let document = warning_report(&warnings).unwrap();

        assert_eq!(document.body.len(), 2);
        assert_eq!(document.body[0].plain_text(), "Processing warnings (2)");
        let table = document.body[1].as_table().unwrap();
        let rows: Vec<String> = table.rows.iter().map(Row::plain_text).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Row::texts(["Kind", "Name", "Message"]).plain_text());
        assert_eq!(
            rows[1],
            Row::texts([
                "Missing variable",
                "Customer.Name",
                "Variable 'Customer.Name' was not found",
            ])
            .plain_text()
        );
        assert_eq!(
            rows[2],
            Row::texts(["Null collection", "Orders", "Collection 'Orders' is null"]).plain_text()
        );
    }

    #[test]
    fn test_empty_report() {
        let document = warning_report(&[]).unwrap();
        let texts: Vec<String> = document.body.iter().map(Block::plain_text).collect();
        assert_eq!(
            texts,
            vec!["Processing warnings (0)", "No warnings were recorded."]
        );
    }

    #[test]
    fn test_names_with_markup_are_kept_verbatim() {
        let warnings = vec![ProcessingWarning::new(WarningKind::MissingCollection, "**x**")];
        let document = warning_report(&warnings).unwrap();
        let table = document.body[1].as_table().unwrap();
        assert!(table.rows[1].plain_text().contains("**x**"));
    }
}

/*
 * pass.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-call processing state.
//!
//! A [`Pass`] is created for every `process` call and threaded through the
//! walker and visitors. It carries:
//!
//! 1. **Options**: the processor's [`ProcessingOptions`]
//! 2. **Warnings**: non-fatal problems, in the order they were found
//! 3. **Counters**: the number of placeholders replaced

use crate::options::ProcessingOptions;
use serde::Serialize;
use std::fmt;

/// The kind of a non-fatal problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A placeholder's target could not be resolved.
    MissingVariable,
    /// A loop's collection could not be resolved.
    MissingCollection,
    /// A loop's collection resolved to null.
    NullCollection,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::MissingVariable => "Missing variable",
            WarningKind::MissingCollection => "Missing collection",
            WarningKind::NullCollection => "Null collection",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal problem found while processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingWarning {
    pub kind: WarningKind,
    /// The variable or collection name as written in the document.
    pub name: String,
    pub message: String,
}

impl ProcessingWarning {
    pub fn new(kind: WarningKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let message = match kind {
            WarningKind::MissingVariable => format!("Variable '{name}' was not found"),
            WarningKind::MissingCollection => format!("Collection '{name}' was not found"),
            WarningKind::NullCollection => format!("Collection '{name}' is null"),
        };
        Self {
            kind,
            name,
            message,
        }
    }
}

impl fmt::Display for ProcessingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collector for warnings raised during a pass.
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<ProcessingWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn add(&mut self, warning: ProcessingWarning) {
        tracing::warn!(kind = ?warning.kind, name = %warning.name, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warn(&mut self, kind: WarningKind, name: impl Into<String>) {
        self.add(ProcessingWarning::new(kind, name));
    }

    pub fn warnings(&self) -> &[ProcessingWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ProcessingWarning> {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// State for one processing call.
pub struct Pass<'a> {
    pub options: &'a ProcessingOptions,
    pub warnings: WarningCollector,
    pub replacement_count: usize,
}

impl<'a> Pass<'a> {
    pub fn new(options: &'a ProcessingOptions) -> Self {
        Self {
            options,
            warnings: WarningCollector::new(),
            replacement_count: 0,
        }
    }

    pub fn warn(&mut self, kind: WarningKind, name: impl Into<String>) {
        self.warnings.warn(kind, name);
    }

    pub(crate) fn count_replacement(&mut self) {
        self.replacement_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_warning_messages() {
        let warning = ProcessingWarning::new(WarningKind::MissingVariable, "Customer.Name");
        assert_eq!(warning.message, "Variable 'Customer.Name' was not found");
        assert_eq!(
            ProcessingWarning::new(WarningKind::NullCollection, "Items").to_string(),
            "Collection 'Items' is null"
        );
    }

    #[test]
    fn test_collector_keeps_order() {
        let options = ProcessingOptions::default();
        let mut pass = Pass::new(&options);
        assert!(pass.warnings.is_empty());

        pass.warn(WarningKind::MissingCollection, "Orders");
        pass.warn(WarningKind::MissingVariable, "Total");
        pass.count_replacement();

        let kinds: Vec<_> = pass.warnings.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::MissingCollection, WarningKind::MissingVariable]
        );
        assert_eq!(pass.replacement_count, 1);
    }

    #[test]
    fn test_warning_serializes_kebab_case() {
        let json = serde_json::to_value(ProcessingWarning::new(WarningKind::NullCollection, "X"))
            .unwrap();
        assert_eq!(json["kind"], "null-collection");
    }
}

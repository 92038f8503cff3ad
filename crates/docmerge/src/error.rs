/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for document processing.
//!
//! Only fatal conditions are errors. Unresolved variables and collections are
//! warnings (see [`crate::pass::ProcessingWarning`]) unless the caller asked
//! for the `fail` missing-variable policy.

use thiserror::Error;

/// Errors that abort a processing pass.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Unbalanced or misordered block markers.
    #[error("Markup error: {message}")]
    Markup { message: String },

    /// Malformed boolean expression text.
    #[error("Invalid expression '{expression}': {message}")]
    Expression { expression: String, message: String },

    /// Malformed property path text.
    #[error("Invalid property path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A placeholder could not be resolved and the policy is `fail`.
    #[error("Variable not found: {name}")]
    MissingVariable { name: String },

    /// Invalid processing configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Configuration or data model JSON could not be read.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    pub(crate) fn markup(message: impl Into<String>) -> Self {
        MergeError::Markup {
            message: message.into(),
        }
    }
}

/// Result type for document processing.
pub type MergeResult<T> = Result<T, MergeError>;

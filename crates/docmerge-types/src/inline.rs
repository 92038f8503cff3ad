/*
 * inline.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

/// Character formatting carried by a run.
///
/// Emphasis flags are the only part the engine ever changes: emphasis markup
/// found in substituted values is merged in as a union, everything else is
/// copied from the run a replacement lands in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in half-points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RunFormat {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    /// Union of emphasis flags; every other property is taken from `self`.
    pub fn with_emphasis(&self, bold: bool, italic: bool, strike: bool) -> Self {
        Self {
            bold: self.bold || bold,
            italic: self.italic || italic,
            strike: self.strike || strike,
            ..self.clone()
        }
    }
}

/// A span of text sharing one [`RunFormat`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub format: RunFormat,
}

impl Run {
    pub fn new(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunFormat::default())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

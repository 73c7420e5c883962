//! Configuration lines
//!
//! Every physical line read from a configuration file becomes one
//! [`ConfigurationLine`]. The classifier wraps each one in a [`ParsableLine`]
//! that records whether the server would actually process it.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// A single line of an Apache configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationLine {
    /// Line exactly as read, without its line terminator
    pub raw: String,

    /// Whitespace-normalized (and, once classified, Define-substituted) text
    pub processed: String,

    /// File the line was read from
    pub file: PathBuf,

    /// 1-based line number where this line starts
    pub line_start: usize,

    /// 1-based line number where this line ends
    pub line_end: usize,

    /// Whether the first non-whitespace character is `#`
    pub is_comment: bool,
}

impl ConfigurationLine {
    /// Build a line from raw text read at `line_number` of `file`
    pub fn new(raw: impl Into<String>, file: impl AsRef<Path>, line_number: usize) -> Self {
        let raw = raw.into();
        let processed = normalize_whitespace(&raw);
        let is_comment = processed.starts_with('#');
        Self {
            raw,
            processed,
            file: file.as_ref().to_path_buf(),
            line_start: line_number,
            line_end: line_number,
            is_comment,
        }
    }

    /// Copy of this line carrying different processed text
    pub fn with_processed(&self, processed: String) -> Self {
        Self {
            processed,
            ..self.clone()
        }
    }

    /// Whether the processed text is empty
    pub fn is_blank(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn is_multi_line(&self) -> bool {
        self.line_start != self.line_end
    }
}

/// A configuration line tagged with its activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsableLine {
    pub line: ConfigurationLine,

    /// Whether the server would process this line
    pub active: bool,
}

impl ParsableLine {
    pub fn new(line: ConfigurationLine, active: bool) -> Self {
        Self { line, active }
    }

    /// Active and not a comment
    pub fn is_effective(&self) -> bool {
        self.active && !self.line.is_comment
    }

    pub fn processed(&self) -> &str {
        &self.line.processed
    }
}

/// Collapse runs of whitespace to a single space and trim both ends
pub fn normalize_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

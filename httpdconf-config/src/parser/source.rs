//! Configuration file text split into lines
//!
//! Each line keeps its own terminator so a file can be written back with
//! every untouched byte unchanged.

use httpdconf_core::{ConfigurationLine, Error, Result};
use std::path::{Path, PathBuf};

/// One physical line and the terminator that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// `"\n"`, `"\r\n"`, or empty for a last line without newline
    pub ending: String,
}

impl Segment {
    pub fn new(text: impl Into<String>, ending: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ending: ending.into(),
        }
    }
}

/// The lines of one configuration file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub segments: Vec<Segment>,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(path, &text))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        let segments = text
            .split_inclusive('\n')
            .map(|chunk| {
                if let Some(body) = chunk.strip_suffix("\r\n") {
                    Segment::new(body, "\r\n")
                } else if let Some(body) = chunk.strip_suffix('\n') {
                    Segment::new(body, "\n")
                } else {
                    Segment::new(chunk, "")
                }
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            segments,
        }
    }

    /// Configuration lines numbered from 1
    pub fn lines(&self) -> Vec<ConfigurationLine> {
        self.segments
            .iter()
            .enumerate()
            .map(|(index, segment)| ConfigurationLine::new(segment.text.clone(), &self.path, index + 1))
            .collect()
    }

    /// Terminator used by the file, `\n` when it has none
    pub fn newline(&self) -> &str {
        self.segments
            .iter()
            .map(|segment| segment.ending.as_str())
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n")
    }

    /// Concatenate segments back into file text
    pub fn render(segments: &[Segment]) -> String {
        let mut text = String::new();
        for segment in segments {
            text.push_str(&segment.text);
            text.push_str(&segment.ending);
        }
        text
    }
}

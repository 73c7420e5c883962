//! Line matchers
//!
//! Case-insensitive recognizers for the handful of line shapes the parser
//! cares about. All matchers expect whitespace-normalized text.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

fn build(pattern: &str) -> Regex {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re,
        // Only called with the constant patterns below.
        Err(e) => unreachable!("invalid line pattern {pattern:?}: {e}"),
    }
}

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| build(r"^\s*(Include|IncludeOptional)\b\s*(.*)$"));
static IF_MODULE_OPEN_NEGATED: LazyLock<Regex> =
    LazyLock::new(|| build(r"^\s*<\s*IfModule\s+!.*>"));
static IF_MODULE_OPEN: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*<\s*IfModule\b.*>"));
static IF_MODULE_CLOSE: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*</\s*IfModule\s*>"));
static VHOST_OPEN: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*<\s*VirtualHost\b.*>"));
static VHOST_CLOSE: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*</\s*VirtualHost\s*>"));
static ENCLOSURE_OPEN: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*<\s*[^/\s].*>"));
static ENCLOSURE_CLOSE: LazyLock<Regex> = LazyLock::new(|| build(r"^\s*</.*>"));

/// `Include` flavour found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Include,
    IncludeOptional,
}

/// Parsed `Include`/`IncludeOptional` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeLine {
    pub kind: IncludeKind,
    /// Target with quotes removed
    pub target: String,
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Match `Include path` / `IncludeOptional path`
pub fn include(line: &str) -> Option<IncludeLine> {
    if is_comment(line) {
        return None;
    }
    let caps = INCLUDE.captures(line)?;
    let kind = if caps[1].eq_ignore_ascii_case("IncludeOptional") {
        IncludeKind::IncludeOptional
    } else {
        IncludeKind::Include
    };
    let target = caps[2].replace('"', "").trim().to_string();
    if target.is_empty() {
        return None;
    }
    Some(IncludeLine { kind, target })
}

pub fn is_if_module_open_negated(line: &str) -> bool {
    IF_MODULE_OPEN_NEGATED.is_match(line)
}

pub fn is_if_module_open(line: &str) -> bool {
    IF_MODULE_OPEN.is_match(line)
}

pub fn is_if_module_close(line: &str) -> bool {
    IF_MODULE_CLOSE.is_match(line)
}

/// Module argument of an `<IfModule ...>` open tag, `!` included
pub fn if_module_argument(line: &str) -> Option<&str> {
    let start = line.find('<')?;
    let rest = line[start + 1..].trim_start();
    let rest = rest.get("IfModule".len()..)?;
    let end = rest.rfind('>')?;
    Some(rest[..end].trim())
}

pub fn is_vhost_open(line: &str) -> bool {
    VHOST_OPEN.is_match(line)
}

pub fn is_vhost_close(line: &str) -> bool {
    VHOST_CLOSE.is_match(line)
}

/// Any `<Type ...>` open tag
pub fn is_enclosure_open(line: &str) -> bool {
    ENCLOSURE_OPEN.is_match(line)
}

/// Any `</Type>` close tag
pub fn is_enclosure_close(line: &str) -> bool {
    ENCLOSURE_CLOSE.is_match(line)
}

/// Matcher for a single directive or enclosure type.
///
/// Names are compared ASCII case-insensitively as a whole word.
#[derive(Debug, Clone)]
pub struct TypeMatcher {
    name: String,
}

impl TypeMatcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Name value...`
    pub fn is_directive(&self, line: &str) -> bool {
        if is_comment(line) {
            return false;
        }
        self.strip_name(line.trim_start())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    }

    /// `<Name ...>`
    pub fn is_open(&self, line: &str) -> bool {
        let Some(tag) = line.trim_start().strip_prefix('<') else {
            return false;
        };
        match self.strip_name(tag.trim_start()) {
            Some(rest) if rest.starts_with('>') => true,
            Some(rest) => rest.starts_with(char::is_whitespace) && rest.contains('>'),
            None => false,
        }
    }

    /// `</Name>`
    pub fn is_close(&self, line: &str) -> bool {
        let Some(tag) = line.trim_start().strip_prefix("</") else {
            return false;
        };
        self.strip_name(tag.trim_start())
            .is_some_and(|rest| rest.trim_start().starts_with('>'))
    }

    /// Text after a leading occurrence of the name
    fn strip_name<'a>(&self, text: &'a str) -> Option<&'a str> {
        let head = text.get(..self.name.len())?;
        if head.eq_ignore_ascii_case(&self.name) {
            text.get(self.name.len()..)
        } else {
            None
        }
    }

    /// Text following the directive keyword
    pub fn directive_remainder<'a>(&self, line: &'a str) -> &'a str {
        let line = line.trim_start();
        line.get(self.name.len()..).unwrap_or("").trim()
    }

    /// Argument of an open tag with the angle brackets removed
    pub fn open_remainder<'a>(&self, line: &'a str) -> &'a str {
        let line = line.trim();
        let line = line.strip_prefix('<').unwrap_or(line).trim_start();
        let line = line.strip_suffix('>').unwrap_or(line);
        line.get(self.name.len()..).unwrap_or("").trim()
    }
}

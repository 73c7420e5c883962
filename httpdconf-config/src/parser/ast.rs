//! Directive and Enclosure trees
//!
//! Built bottom-up from classified lines; every node owns its children.

use httpdconf_core::ConfigurationLine;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A single configuration statement, e.g. `Listen 443 https`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Directive name
    pub name: String,

    /// Arguments in order
    pub values: Vec<String>,

    /// Line the directive was read from
    pub source: ConfigurationLine,
}

impl Directive {
    pub fn new(name: impl Into<String>, values: Vec<String>, source: ConfigurationLine) -> Self {
        Self {
            name: name.into(),
            values,
            source,
        }
    }

    /// Values joined by single spaces
    pub fn value(&self) -> String {
        self.values.join(" ")
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for value in &self.values {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// A `<Type value> ... </Type>` block
///
/// ```text
/// <VirtualHost *:80>
///     ServerAdmin webmaster@localhost
///     <Location /status>
///         SetHandler server-status
///     </Location>
/// </VirtualHost>
/// ```
///
/// has name `VirtualHost`, value `*:80`, one directive (`ServerAdmin`) and one
/// child enclosure (`Location`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enclosure {
    pub name: String,
    pub value: String,

    /// Directives directly inside this block
    pub directives: Vec<Directive>,

    /// Blocks directly inside this block
    pub children: Vec<Enclosure>,

    /// File holding the open tag
    pub file: PathBuf,

    /// Line of the open tag
    pub line_start: usize,

    /// Line of the close tag
    pub line_end: usize,

    /// Lines owned by this block itself: open tag, directives, close tag
    pub lines: Vec<ConfigurationLine>,
}

impl Enclosure {
    /// Direct children of the given type (case-insensitive)
    pub fn children_of_type<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Enclosure> {
        self.children
            .iter()
            .filter(move |child| child.name.eq_ignore_ascii_case(name))
    }

    /// Directives of the given type directly inside this block
    pub fn directives_of_type<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Directive> {
        self.directives
            .iter()
            .filter(move |directive| directive.name.eq_ignore_ascii_case(name))
    }

    /// Directives of the given type at any depth, in document order per level
    pub fn find_directives<'a>(&'a self, name: &str) -> Vec<&'a Directive> {
        let mut found: Vec<&'a Directive> = self
            .directives
            .iter()
            .filter(|directive| directive.name.eq_ignore_ascii_case(name))
            .collect();
        for child in &self.children {
            found.extend(child.find_directives(name));
        }
        found
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        if self.value.is_empty() {
            writeln!(f, "{indent}<{}>", self.name)?;
        } else {
            writeln!(f, "{indent}<{} {}>", self.name, self.value)?;
        }
        for directive in &self.directives {
            writeln!(f, "{indent}    {directive}")?;
        }
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        writeln!(f, "{indent}</{}>", self.name)
    }
}

impl fmt::Display for Enclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

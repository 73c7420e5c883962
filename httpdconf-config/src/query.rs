//! Read-only queries over the effective configuration

use crate::HttpdConfig;
use crate::parser::{Directive, Enclosure, TypeMatcher, directives_of, enclosures_of, tokenize};
use httpdconf_core::{ParsableLine, Result};
use regex::Regex;
use std::path::PathBuf;

impl HttpdConfig {
    /// Values of every active directive of the given type, each joined by spaces
    pub fn get_directive_values(&self, directive_type: &str, include_virtual_hosts: bool) -> Result<Vec<String>> {
        let lines = self.snapshot(directive_type, include_virtual_hosts)?.lines;
        let matcher = TypeMatcher::new(directive_type);

        let values: Vec<String> = lines
            .iter()
            .filter(|line| line.is_effective() && matcher.is_directive(line.processed()))
            .map(|line| tokenize(line.processed()).joined_values())
            .collect();

        tracing::debug!("🔎 {} value(s) for {}", values.len(), directive_type);
        Ok(values)
    }

    /// Every active directive of the given type
    pub fn get_directive(&self, directive_type: &str, include_virtual_hosts: bool) -> Result<Vec<Directive>> {
        let lines = self.snapshot(directive_type, include_virtual_hosts)?.lines;
        Ok(directives_of(&lines, directive_type))
    }

    /// Every active enclosure of the given type, outermost first
    pub fn get_enclosure(&self, enclosure_type: &str, include_virtual_hosts: bool) -> Result<Vec<Enclosure>> {
        let lines = self.snapshot(enclosure_type, include_virtual_hosts)?.lines;
        enclosures_of(&lines, enclosure_type)
    }

    /// File holding the first active directive of the given type whose
    /// arguments match `value_pattern`
    pub fn find_first_file_containing(
        &self,
        directive_type: &str,
        value_pattern: &Regex,
        include_virtual_hosts: bool,
    ) -> Result<Option<PathBuf>> {
        let lines = self.snapshot(directive_type, include_virtual_hosts)?.lines;
        let matcher = TypeMatcher::new(directive_type);
        Ok(first_match(&lines, &matcher, value_pattern).map(|line| line.line.file.clone()))
    }

    /// Distinct files reachable from the root file, in first-seen order
    pub fn active_file_list(&self) -> Result<Vec<PathBuf>> {
        let (resolution, _) = self.resolve()?;
        let mut files = resolution.distinct_files();
        if !files.iter().any(|file| file == self.root_file()) {
            files.insert(0, self.root_file().to_path_buf());
        }
        Ok(files)
    }
}

/// First effective line that is a `matcher` directive with matching arguments
pub(crate) fn first_match<'a>(
    lines: &'a [ParsableLine],
    matcher: &TypeMatcher,
    value_pattern: &Regex,
) -> Option<&'a ParsableLine> {
    lines.iter().find(|line| is_match(line, matcher, value_pattern))
}

pub(crate) fn is_match(line: &ParsableLine, matcher: &TypeMatcher, value_pattern: &Regex) -> bool {
    let text = line.processed();
    line.is_effective() && matcher.is_directive(text) && value_pattern.is_match(matcher.directive_remainder(text))
}

//! In-place edits of configuration files
//!
//! Every edit reads the whole target file, rebuilds it line by line, and
//! replaces it atomically. Lines an edit does not touch keep their exact
//! bytes, terminators included. Include directives inside the target are not
//! followed.

use crate::HttpdConfig;
use crate::parser::{Segment, SourceFile, TypeMatcher, classify};
use crate::query::{first_match, is_match};
use httpdconf_core::{Error, ParsableLine, Result};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl HttpdConfig {
    /// Insert `text` as a new line next to the first active directive of the
    /// given type whose arguments match `value_pattern`.
    ///
    /// Returns `false` and writes nothing when no directive matches.
    pub fn insert_relative_to_first_match(
        &self,
        directive_type: &str,
        value_pattern: &Regex,
        text: &str,
        before: bool,
        include_virtual_hosts: bool,
    ) -> Result<bool> {
        let Some(file) = self.find_first_file_containing(directive_type, value_pattern, include_virtual_hosts)?
        else {
            return Ok(false);
        };

        let (mut source, lines) = self.classify_file(&file, directive_type, include_virtual_hosts)?;
        let matcher = TypeMatcher::new(directive_type);
        let Some(index) = first_match(&lines, &matcher, value_pattern).map(|line| line.line.line_start - 1)
        else {
            return Ok(false);
        };

        let newline = source.newline().to_string();
        if before {
            source.segments.insert(index, Segment::new(text, newline));
        } else {
            let ending = std::mem::replace(&mut source.segments[index].ending, newline);
            source.segments.insert(index + 1, Segment::new(text, ending));
        }

        tracing::info!(
            "✏️ Inserted {:?} {} line {} of {}",
            text,
            if before { "before" } else { "after" },
            index + 1,
            file.display()
        );
        write_atomic(&file, &source.segments)?;
        Ok(true)
    }

    /// Comment out or delete every active directive of the given type in
    /// `file` whose arguments match `value_pattern`.
    ///
    /// Returns whether the file was rewritten.
    pub fn comment_or_delete_directive(
        &self,
        directive_type: &str,
        file: &Path,
        value_pattern: &Regex,
        comment_out: bool,
    ) -> Result<bool> {
        let (source, lines) = self.classify_file(file, directive_type, true)?;
        let matcher = TypeMatcher::new(directive_type);

        let mut segments = Vec::with_capacity(source.segments.len());
        let mut changed = 0usize;
        for (segment, line) in source.segments.into_iter().zip(&lines) {
            if !is_match(line, &matcher, value_pattern) {
                segments.push(segment);
                continue;
            }
            changed += 1;
            if comment_out {
                segments.push(commented(segment));
            }
        }

        if changed == 0 {
            return Ok(false);
        }

        tracing::info!(
            "✏️ {} {} {} directive(s) in {}",
            if comment_out { "Commented out" } else { "Deleted" },
            changed,
            directive_type,
            file.display()
        );
        write_atomic(file, &segments)?;
        Ok(true)
    }

    /// Comment out or delete every active enclosure of the given type whose
    /// open tag argument matches `value_pattern`, across all active files.
    ///
    /// Returns the files that were rewritten. A file holding an unterminated
    /// matching block fails the call and is left untouched; files rewritten
    /// before it stay rewritten.
    pub fn comment_or_delete_enclosure(
        &self,
        enclosure_type: &str,
        value_pattern: &Regex,
        comment_out: bool,
        include_virtual_hosts: bool,
    ) -> Result<Vec<PathBuf>> {
        let matcher = TypeMatcher::new(enclosure_type);
        let mut rewritten = Vec::new();

        for file in self.active_file_list()? {
            let (source, lines) = self.classify_file(&file, enclosure_type, include_virtual_hosts)?;
            let Some(segments) = strip_enclosures(source.segments, &lines, &matcher, value_pattern, comment_out)?
            else {
                continue;
            };

            tracing::info!(
                "✏️ {} <{}> block(s) in {}",
                if comment_out { "Commented out" } else { "Deleted" },
                enclosure_type,
                file.display()
            );
            write_atomic(&file, &segments)?;
            rewritten.push(file);
        }

        Ok(rewritten)
    }

    /// Replace the first active directive of the given type in `file` whose
    /// arguments match `value_pattern` with `<type> <insert_value>`.
    ///
    /// With `add_if_missing`, a file without a match gets a blank line and the
    /// new directive appended. Returns whether the file was rewritten.
    pub fn set_directive_value(
        &self,
        directive_type: &str,
        file: &Path,
        insert_value: &str,
        value_pattern: &Regex,
        add_if_missing: bool,
    ) -> Result<bool> {
        let (mut source, lines) = self.classify_file(file, directive_type, true)?;
        let matcher = TypeMatcher::new(directive_type);
        let directive = format!("{} {}", directive_type, insert_value);

        match first_match(&lines, &matcher, value_pattern) {
            Some(line) => {
                let index = line.line.line_start - 1;
                tracing::info!("✏️ Set line {} of {} to {:?}", index + 1, file.display(), directive);
                source.segments[index].text = directive;
            }
            None if add_if_missing => {
                let newline = source.newline().to_string();
                if let Some(last) = source.segments.last_mut() {
                    if last.ending.is_empty() {
                        last.ending = newline.clone();
                    }
                }
                tracing::info!("✏️ Appended {:?} to {}", directive, file.display());
                source.segments.push(Segment::new("", newline.clone()));
                source.segments.push(Segment::new(directive, newline));
            }
            None => return Ok(false),
        }

        write_atomic(file, &source.segments)?;
        Ok(true)
    }

    /// Read one file and classify its own lines
    fn classify_file(
        &self,
        file: &Path,
        directive_type: &str,
        include_virtual_hosts: bool,
    ) -> Result<(SourceFile, Vec<ParsableLine>)> {
        let defines = crate::defines_for(directive_type, self.defines()?);
        let source = SourceFile::read(file)?;
        let lines = classify(&source.lines(), &defines, self.modules(), include_virtual_hosts);
        Ok((source, lines))
    }
}

/// Rebuild a file without the matching enclosures.
///
/// Returns `None` when nothing matched.
fn strip_enclosures(
    segments: Vec<Segment>,
    lines: &[ParsableLine],
    matcher: &TypeMatcher,
    value_pattern: &Regex,
    comment_out: bool,
) -> Result<Option<Vec<Segment>>> {
    let mut output = Vec::with_capacity(segments.len());
    let mut depth = 0usize;
    let mut opened_at = 0usize;
    let mut matched = false;

    for (segment, line) in segments.into_iter().zip(lines) {
        let text = line.processed();

        if depth == 0 {
            let opens = line.is_effective()
                && matcher.is_open(text)
                && value_pattern.is_match(matcher.open_remainder(text));
            if !opens {
                output.push(segment);
                continue;
            }
            matched = true;
            opened_at = line.line.line_start;
            depth = 1;
        } else if !line.line.is_comment {
            if matcher.is_open(text) {
                depth += 1;
            } else if matcher.is_close(text) {
                depth -= 1;
            }
        }

        if comment_out {
            if line.line.is_comment || line.line.is_blank() {
                output.push(segment);
            } else {
                output.push(commented(segment));
            }
        }
    }

    if depth > 0 {
        return Err(Error::UnterminatedBlock {
            kind: matcher.name().to_string(),
            file: lines.first().map(|l| l.line.file.clone()).unwrap_or_default(),
            line: opened_at,
        });
    }

    Ok(matched.then_some(output))
}

fn commented(segment: Segment) -> Segment {
    Segment::new(format!("#{}", segment.text), segment.ending)
}

/// Replace `path` with `segments`, keeping its permissions.
///
/// Symlinks are followed so the link stays in place and its target is
/// rewritten.
fn write_atomic(path: &Path, segments: &[Segment]) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| Error::io(path, e))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(&target).map_err(|e| Error::io(&target, e))?.permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    temp.write_all(SourceFile::render(segments).as_bytes())
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file().sync_all().map_err(|e| Error::io(temp.path(), e))?;
    fs::set_permissions(temp.path(), permissions).map_err(|e| Error::io(temp.path(), e))?;

    temp.persist(&target).map_err(|e| Error::io(&target, e.error))?;
    tracing::debug!("💾 Wrote {}", target.display());
    Ok(())
}

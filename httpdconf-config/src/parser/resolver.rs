//! Include resolution
//!
//! Expands `Include`/`IncludeOptional` directives depth-first, at the point
//! where they occur, into one ordered sequence of lines.

use crate::parser::defines::DefineTable;
use crate::parser::patterns::{self, IncludeKind, IncludeLine};
use crate::parser::source::SourceFile;
use httpdconf_core::{ConfigurationLine, Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Deepest Include nesting the resolver follows
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Lines of a configuration tree in processing order
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub lines: Vec<ConfigurationLine>,

    /// Every file opened, in the order it was opened (may repeat)
    pub files: Vec<PathBuf>,
}

impl Resolution {
    /// Files in first-seen order without duplicates.
    ///
    /// Two spellings of the same file count once; the first spelling is kept.
    pub fn distinct_files(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.files
            .iter()
            .filter(|file| seen.insert(file.canonicalize().unwrap_or_else(|_| file.to_path_buf())))
            .cloned()
            .collect()
    }
}

/// Resolves Include directives relative to a server root
#[derive(Debug, Clone)]
pub struct LineResolver {
    server_root: PathBuf,
}

impl LineResolver {
    pub fn new(server_root: impl Into<PathBuf>) -> Self {
        Self {
            server_root: server_root.into(),
        }
    }

    pub fn server_root(&self) -> &Path {
        &self.server_root
    }

    /// Resolve `root_file` and everything it includes.
    ///
    /// `defines` is applied to Include targets. An Include target that still
    /// holds a `${...}` reference afterwards is skipped.
    pub fn resolve(&self, root_file: &Path, defines: &DefineTable) -> Result<Resolution> {
        if !root_file.exists() {
            return Err(Error::ConfigNotFound {
                path: root_file.to_path_buf(),
            });
        }
        if !self.server_root.exists() {
            return Err(Error::ConfigNotFound {
                path: self.server_root.clone(),
            });
        }

        let mut resolution = Resolution::default();
        let mut stack = Vec::new();
        self.resolve_file(root_file, defines, &mut stack, &mut resolution)?;

        tracing::debug!(
            "📚 Resolved {} line(s) from {} file(s)",
            resolution.lines.len(),
            resolution.files.len()
        );
        Ok(resolution)
    }

    fn resolve_file(
        &self,
        file: &Path,
        defines: &DefineTable,
        stack: &mut Vec<PathBuf>,
        resolution: &mut Resolution,
    ) -> Result<()> {
        let canonical = file.canonicalize().map_err(|e| Error::io(file, e))?;
        if stack.contains(&canonical) {
            return Err(Error::IncludeCycle {
                file: file.to_path_buf(),
            });
        }
        if stack.len() >= MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeDepthExceeded {
                file: file.to_path_buf(),
                limit: MAX_INCLUDE_DEPTH,
            });
        }

        tracing::debug!("📄 Reading {}", file.display());
        stack.push(canonical);
        resolution.files.push(file.to_path_buf());

        for line in read_file_lines(file)? {
            let include = if line.is_comment {
                None
            } else {
                patterns::include(&substitute(defines, &line.processed))
            };
            let line_number = line.line_start;
            resolution.lines.push(line);

            if let Some(include) = include {
                self.resolve_include(file, line_number, &include, defines, stack, resolution)?;
            }
        }

        stack.pop();
        Ok(())
    }

    fn resolve_include(
        &self,
        file: &Path,
        line: usize,
        include: &IncludeLine,
        defines: &DefineTable,
        stack: &mut Vec<PathBuf>,
        resolution: &mut Resolution,
    ) -> Result<()> {
        if include.target.contains("${") {
            tracing::warn!(
                "⚠️ Skipping Include with unresolved variable at {}:{}: {}",
                file.display(),
                line,
                include.target
            );
            return Ok(());
        }

        let targets = self.expand_target(&include.target);
        if targets.is_empty() {
            return match include.kind {
                IncludeKind::IncludeOptional => {
                    tracing::warn!("⏭️ Optional include matched nothing: {}", include.target);
                    Ok(())
                }
                IncludeKind::Include => Err(Error::IncludeTargetMissing {
                    file: file.to_path_buf(),
                    line,
                    target: include.target.clone(),
                }),
            };
        }

        for target in targets {
            self.resolve_file(&target, defines, stack, resolution)?;
        }
        Ok(())
    }

    /// Absolute targets start with `/` or carry a drive letter
    pub fn target_path(&self, target: &str) -> PathBuf {
        if target.starts_with('/') || target.contains(':') {
            PathBuf::from(target)
        } else {
            self.server_root.join(target)
        }
    }

    /// Files an Include target stands for, in processing order
    pub fn expand_target(&self, target: &str) -> Vec<PathBuf> {
        let path = self.target_path(target);

        if path.is_dir() {
            return sorted_files(&path, |_| true);
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if file_name.contains('*') {
            let Some(pattern) = wildcard_pattern(&file_name) else {
                return Vec::new();
            };
            return match path.parent() {
                Some(parent) if parent.is_dir() => {
                    sorted_files(parent, |name| pattern.is_match(name))
                }
                _ => Vec::new(),
            };
        }

        if path.is_file() { vec![path] } else { Vec::new() }
    }
}

fn substitute(defines: &DefineTable, line: &str) -> String {
    if defines.is_empty() {
        line.to_string()
    } else {
        defines.substitute(line)
    }
}

/// Non-directory children of `dir` accepted by `keep`, sorted by name
fn sorted_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    names
        .into_iter()
        .filter(|name| keep(name))
        .map(|name| dir.join(name))
        .filter(|path| !path.is_dir())
        .collect()
}

/// File-name wildcard: `*` matches any run of characters
fn wildcard_pattern(file_name: &str) -> Option<Regex> {
    let body = file_name
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).ok()
}

/// Read one file into configuration lines without expanding Includes
pub fn read_file_lines(file: &Path) -> Result<Vec<ConfigurationLine>> {
    Ok(SourceFile::read(file)?.lines())
}

//! httpdconf Configuration Parser
//!
//! This crate resolves, queries, and edits Apache httpd configuration trees
//! without running the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use httpdconf_config::HttpdConfig;
//! use httpdconf_core::ModuleInventory;
//!
//! let modules = ModuleInventory::new(["core_module"], ["ssl_module"]);
//! let config = HttpdConfig::new("/etc/httpd/conf/httpd.conf", "/etc/httpd", modules)?;
//!
//! // Effective Listen values, VirtualHost content included
//! let listen = config.get_directive_values("Listen", true)?;
//!
//! // Comment out every <Location /admin> block
//! let admin = regex::Regex::new("^/admin$")?;
//! config.comment_or_delete_enclosure("Location", &admin, true, true)?;
//! ```

pub mod editor;
pub mod parser;
pub mod query;

pub use parser::{
    Define, DefineTable, Directive, Enclosure, LineResolver, Resolution, Tokens, TypeMatcher,
    classify, collect_defines, directives_of, enclosures_of, parse_enclosure, tokenize,
};

use httpdconf_core::{Error, ModuleInventory, ParsableLine, Result, ServerProfile};
use parser::DEFINE_DIRECTIVE;
use std::path::{Path, PathBuf};

/// An Apache configuration tree rooted at one file
#[derive(Debug, Clone)]
pub struct HttpdConfig {
    root_file: PathBuf,
    resolver: LineResolver,
    modules: ModuleInventory,
}

/// Resolved and classified configuration for one logical operation
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub resolution: Resolution,
    pub defines: DefineTable,
    pub lines: Vec<ParsableLine>,
}

impl HttpdConfig {
    /// Open a configuration tree.
    ///
    /// Fails with [`Error::ConfigNotFound`] when either path is missing.
    pub fn new(
        root_file: impl Into<PathBuf>,
        server_root: impl Into<PathBuf>,
        modules: ModuleInventory,
    ) -> Result<Self> {
        let root_file = root_file.into();
        let server_root = server_root.into();

        for path in [&root_file, &server_root] {
            if !path.exists() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
        }

        tracing::debug!(
            "🗂️ Opened configuration {} (server root {})",
            root_file.display(),
            server_root.display()
        );

        Ok(Self {
            root_file,
            resolver: LineResolver::new(server_root),
            modules,
        })
    }

    /// Open the configuration tree a server profile points at
    pub fn from_profile(profile: &ServerProfile) -> Result<Self> {
        let root_file = profile
            .root_file
            .clone()
            .ok_or_else(|| Error::Profile("root_file is not set".to_string()))?;
        let server_root = profile
            .server_root
            .clone()
            .ok_or_else(|| Error::Profile("server_root is not set".to_string()))?;
        Self::new(root_file, server_root, profile.inventory())
    }

    pub fn root_file(&self) -> &Path {
        &self.root_file
    }

    pub fn server_root(&self) -> &Path {
        self.resolver.server_root()
    }

    pub fn modules(&self) -> &ModuleInventory {
        &self.modules
    }

    /// Resolve the tree and collect its Defines.
    ///
    /// Resolution runs once without Defines; when any are found it runs again
    /// with them so Include targets may reference `${...}` variables.
    pub fn resolve(&self) -> Result<(Resolution, DefineTable)> {
        let first = self.resolver.resolve(&self.root_file, &DefineTable::empty())?;
        let defines = collect_defines(&first.lines, &self.modules);
        if defines.is_empty() {
            return Ok((first, DefineTable::empty()));
        }

        let table = DefineTable::new(defines);
        let second = self.resolver.resolve(&self.root_file, &table)?;
        let table = DefineTable::new(collect_defines(&second.lines, &self.modules));
        Ok((second, table))
    }

    /// Defines in effect for the whole tree
    pub fn defines(&self) -> Result<DefineTable> {
        Ok(self.resolve()?.1)
    }

    /// Resolve and classify the whole tree.
    ///
    /// Queries about `Define` itself run without substitution.
    pub fn snapshot(&self, directive_type: &str, include_virtual_hosts: bool) -> Result<Snapshot> {
        let (resolution, defines) = self.resolve()?;
        let defines = defines_for(directive_type, defines);
        let lines = classify(&resolution.lines, &defines, &self.modules, include_virtual_hosts);
        Ok(Snapshot {
            resolution,
            defines,
            lines,
        })
    }

    /// Every resolved line with its activity
    pub fn parsable_lines(&self, include_virtual_hosts: bool) -> Result<Vec<ParsableLine>> {
        Ok(self.snapshot("", include_virtual_hosts)?.lines)
    }
}

/// Define table to use for an operation on `directive_type`
fn defines_for(directive_type: &str, defines: DefineTable) -> DefineTable {
    if directive_type.trim().eq_ignore_ascii_case(DEFINE_DIRECTIVE) {
        DefineTable::empty()
    } else {
        defines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_requires_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let modules = ModuleInventory::default();

        let err = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path(), modules.clone()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));

        fs::write(dir.path().join("httpd.conf"), "Listen 80\n").unwrap();
        let err = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path().join("nope"), modules.clone())
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));

        let config = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path(), modules).unwrap();
        assert_eq!(config.server_root(), dir.path());
    }

    #[test]
    fn test_from_profile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("httpd.conf"), "Listen 80\n").unwrap();

        let mut profile = ServerProfile {
            root_file: Some(dir.path().join("httpd.conf")),
            ..Default::default()
        };
        assert!(matches!(HttpdConfig::from_profile(&profile), Err(Error::Profile(_))));

        profile.server_root = Some(dir.path().to_path_buf());
        profile.static_modules = vec!["core_module".to_string()];
        let config = HttpdConfig::from_profile(&profile).unwrap();
        assert!(config.modules().is_loaded("core"));
    }

    #[test]
    fn test_define_in_include_target() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("extra")).unwrap();
        fs::write(
            dir.path().join("httpd.conf"),
            "Define CONF extra\nInclude ${CONF}/ports.conf\n",
        )
        .unwrap();
        fs::write(dir.path().join("extra/ports.conf"), "Listen 8443\nDefine PORT 9000\n").unwrap();

        let config = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path(), ModuleInventory::default())
            .unwrap();
        let (resolution, defines) = config.resolve().unwrap();
        assert_eq!(resolution.lines.len(), 4);
        assert_eq!(defines.get("PORT"), Some("9000"));
    }

    #[test]
    fn test_define_queries_are_not_substituted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("httpd.conf"), "Define A 1\nDefine B ${A}\n").unwrap();
        let config = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path(), ModuleInventory::default())
            .unwrap();

        let snapshot = config.snapshot("define", true).unwrap();
        assert!(snapshot.defines.is_empty());
        assert_eq!(snapshot.lines[1].line.processed, "Define B ${A}");

        let snapshot = config.snapshot("Listen", true).unwrap();
        assert_eq!(snapshot.lines[1].line.processed, "Define B 1");
    }
}

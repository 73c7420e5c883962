//! Module inventory
//!
//! The set of modules compiled into (static) or loaded by (shared) the target
//! server. `<IfModule>` blocks are evaluated against this inventory.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a module is made available to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Compiled into the server binary
    Static,
    /// Loaded with `LoadModule`
    Shared,
    /// Present on disk but not loaded
    Available,
}

/// A single server module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
}

impl Module {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Name used for `IfModule` comparisons
    pub fn canonical_name(&self) -> String {
        canonical_module_name(&self.name)
    }
}

/// Static and shared modules known to be loaded
#[derive(Debug, Clone, Default)]
pub struct ModuleInventory {
    modules: Vec<Module>,
    static_names: HashSet<String>,
    shared_names: HashSet<String>,
}

impl ModuleInventory {
    pub fn new<S, T>(static_modules: S, shared_modules: T) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let modules = static_modules
            .into_iter()
            .map(|name| Module::new(name, ModuleKind::Static))
            .chain(
                shared_modules
                    .into_iter()
                    .map(|name| Module::new(name, ModuleKind::Shared)),
            )
            .collect();
        Self::from_modules(modules)
    }

    /// Build an inventory from already-typed modules
    pub fn from_modules(modules: Vec<Module>) -> Self {
        let mut static_names = HashSet::new();
        let mut shared_names = HashSet::new();
        for module in &modules {
            match module.kind {
                ModuleKind::Static => {
                    static_names.insert(module.canonical_name());
                }
                ModuleKind::Shared => {
                    shared_names.insert(module.canonical_name());
                }
                ModuleKind::Available => {}
            }
        }
        Self {
            modules,
            static_names,
            shared_names,
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn is_static(&self, identifier: &str) -> bool {
        self.static_names.contains(&canonical_module_name(identifier))
    }

    pub fn is_shared(&self, identifier: &str) -> bool {
        self.shared_names.contains(&canonical_module_name(identifier))
    }

    /// Whether the module is compiled in or loaded.
    ///
    /// `identifier` may be a module identifier (`ssl_module`) or a module
    /// source file (`mod_ssl.c`).
    pub fn is_loaded(&self, identifier: &str) -> bool {
        self.is_static(identifier) || self.is_shared(identifier)
    }
}

/// Reduce a module identifier or file name to its bare name.
///
/// `ssl_module`, `mod_ssl.c`, `!mod_ssl.c` and `"ssl_module"` all become `ssl`.
pub fn canonical_module_name(identifier: &str) -> String {
    let mut name = identifier.trim().trim_matches('"').trim();
    name = name.strip_prefix('!').unwrap_or(name).trim();
    name = name.strip_prefix("mod_").unwrap_or(name);
    name = name.strip_suffix(".c").unwrap_or(name);
    name = name.strip_suffix("_module").unwrap_or(name);
    name.to_string()
}

//! Server profile types
//!
//! A profile describes the server installation a configuration tree belongs
//! to: where the tree starts and which modules the server has loaded.

use crate::modules::ModuleInventory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Installation facts consumed by the parser
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerProfile {
    /// Root configuration file (e.g. `conf/httpd.conf`)
    pub root_file: Option<PathBuf>,

    /// Server root that relative `Include` paths are resolved against
    pub server_root: Option<PathBuf>,

    /// Modules compiled into the server binary
    #[serde(default)]
    pub static_modules: Vec<String>,

    /// Modules loaded with `LoadModule`
    #[serde(default)]
    pub shared_modules: Vec<String>,
}

impl ServerProfile {
    /// Module inventory described by this profile
    pub fn inventory(&self) -> ModuleInventory {
        ModuleInventory::new(
            self.static_modules.iter().cloned(),
            self.shared_modules.iter().cloned(),
        )
    }

    /// Overlay values from `other` that are set
    pub fn merge(mut self, other: ServerProfile) -> Self {
        if other.root_file.is_some() {
            self.root_file = other.root_file;
        }
        if other.server_root.is_some() {
            self.server_root = other.server_root;
        }
        if !other.static_modules.is_empty() {
            self.static_modules = other.static_modules;
        }
        if !other.shared_modules.is_empty() {
            self.shared_modules = other.shared_modules;
        }
        self
    }
}

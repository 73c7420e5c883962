//! httpdconf Core Library
//!
//! This crate provides the shared building blocks for httpdconf:
//! error handling, configuration line types, the module inventory used to
//! evaluate `<IfModule>` blocks, and server profile loading.

pub mod config;
pub mod error;
pub mod line;
pub mod modules;

pub use config::{ProfileLoader, ServerProfile};
pub use error::{Error, Result};
pub use line::{ConfigurationLine, ParsableLine, normalize_whitespace};
pub use modules::{Module, ModuleInventory, ModuleKind, canonical_module_name};

/// httpdconf version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

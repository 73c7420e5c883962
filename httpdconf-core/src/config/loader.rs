//! Server profile loader

use crate::config::ServerProfile;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Loader for server profiles in TOML or JSON
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load a profile from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ServerProfile> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Profile(format!("Failed to read profile {}: {}", path.display(), e)))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        tracing::debug!("📄 Loading server profile from {}", path.display());

        match ext {
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            _ => Err(Error::Profile(format!("Unknown profile format: {}", ext))),
        }
    }

    /// Parse JSON profile
    pub fn from_json(content: &str) -> Result<ServerProfile> {
        serde_json::from_str(content)
            .map_err(|e| Error::Profile(format!("Invalid JSON: {}", e)))
    }

    /// Parse TOML profile
    pub fn from_toml(content: &str) -> Result<ServerProfile> {
        toml::from_str(content)
            .map_err(|e| Error::Profile(format!("Invalid TOML: {}", e)))
    }

    /// Profile location used when none is given
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("httpdconf")
            .join("profile.toml")
    }
}

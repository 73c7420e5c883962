//! Error types for httpdconf

use std::path::PathBuf;
use thiserror::Error;

/// Result type for httpdconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for httpdconf
#[derive(Error, Debug)]
pub enum Error {
    /// Root configuration file or server root is missing
    #[error("Configuration not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// A non-optional `Include` resolved to nothing
    #[error("Include target missing: {target} (referenced at {}:{line})", file.display())]
    IncludeTargetMissing {
        file: PathBuf,
        line: usize,
        target: String,
    },

    /// A file includes itself, directly or through other files
    #[error("Include cycle detected at {}", file.display())]
    IncludeCycle { file: PathBuf },

    /// Include nesting went deeper than the resolver allows
    #[error("Include depth limit of {limit} exceeded at {}", file.display())]
    IncludeDepthExceeded { file: PathBuf, limit: usize },

    /// A block was opened but never closed before end of input
    #[error("Unterminated <{kind}> block opened at {}:{line}", file.display())]
    UnterminatedBlock {
        kind: String,
        file: PathBuf,
        line: usize,
    },

    /// IO error on a specific file
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Server profile could not be loaded
    #[error("Profile error: {0}")]
    Profile(String),
}

impl Error {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_missing_message() {
        let err = Error::IncludeTargetMissing {
            file: PathBuf::from("/etc/httpd/conf/httpd.conf"),
            line: 12,
            target: "conf.d/*.conf".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Include target missing: conf.d/*.conf (referenced at /etc/httpd/conf/httpd.conf:12)"
        );
    }

    #[test]
    fn test_io_keeps_source() {
        let err = Error::io("/tmp/x.conf", std::io::Error::other("boom"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("IO error on /tmp/x.conf"));
    }
}

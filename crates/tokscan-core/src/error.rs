//! Error types for the tokscan-core library.
//!
//! Only conditions that stop an analysis outright are represented here.
//! Heuristic misses (no special tokens, undecodable token text, identifier
//! windows running off the buffer) are reported through the scan results
//! instead of being raised.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tokscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all tokscan operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or stat the input file
    #[error("failed to open file '{path}': {source}")]
    FileOpen {
        /// Path to the file that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to memory-map the input file
    #[error("failed to map file '{path}': {source}")]
    FileMap {
        /// Path to the file that failed to map
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A scanner setting is out of its usable range
    #[error("invalid scanner configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a new file open error
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file map error
    pub fn file_map(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileMap {
            path: path.into(),
            source,
        }
    }

    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns true if the error came from accessing the input file
    pub fn is_io(&self) -> bool {
        matches!(self, Self::FileOpen { .. } | Self::FileMap { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::file_open(
            "/models/missing.gguf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("failed to open"));
        assert!(err.to_string().contains("/models/missing.gguf"));
    }

    #[test]
    fn test_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(Error::file_map("model.gguf", io).is_io());
        assert!(!Error::invalid_config("lookahead must be positive").is_io());
    }
}

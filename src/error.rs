//! Error types for configuration loading and task execution.
//!
//! Configuration errors are fatal: they abort before any task is defined,
//! so a broken override file can never produce a build with wrong output
//! paths.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error for the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Override file exists but is not a valid configuration document.
    #[error("failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A config leaf has a shape that cannot be resolved to a path.
    #[error("invalid path value at '{key}': {message}")]
    InvalidPath { key: String, message: String },

    /// Invalid glob pattern in a resolved input or watch field.
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// IO error while reading sources or writing outputs.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// File watcher setup failed.
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_path(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

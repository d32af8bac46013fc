//! Error types for the headless runner.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs or writing results.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// A fighter argument was neither a preset nor a readable file.
    #[error("Unknown fighter '{0}': not a preset name or a .ron file")]
    UnknownFighter(String),

    /// Failed to read or write a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was rejected by the kernel.
    #[error("Invalid configuration in {path}: {source}")]
    Config {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: duel_core::error::DuelError,
    },

    /// Failed to serialize a configuration back to RON.
    #[error("Failed to write RON: {0}")]
    Ron(#[from] ron::Error),

    /// Failed to (de)serialize JSON results.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The batch thread pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl HeadlessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, source: duel_core::error::DuelError) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }
}

/// Result type for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;

//! Error types for the duel simulation.
//!
//! Errors only surface at the configuration boundary. Once a duel is
//! running, every failure resolves locally to a safe default.

use thiserror::Error;

/// Result type alias using [`DuelError`].
pub type Result<T> = std::result::Result<T, DuelError>;

/// Top-level error type for configuration and setup failures.
#[derive(Debug, Error)]
pub enum DuelError {
    /// A RON document could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    ConfigParse {
        /// Which kind of document failed (skill catalog, fighter, arena...).
        what: &'static str,
        /// Parser error message.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration for '{name}': {reason}")]
    InvalidConfig {
        /// Name of the configured object.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl DuelError {
    pub(crate) fn parse(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ConfigParse {
            what,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

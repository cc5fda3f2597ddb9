//! Error types for the key event sink.
//!
//! The processor sorts every failure into one of three classes:
//!
//! - **Decode**: the input line is not JSON. Reported, line skipped.
//! - **Write**: the CSV file could not be opened or appended. Reported,
//!   record dropped.
//! - **Unexpected**: anything else. Reported, run ends.
//!
//! `Display` of each variant is the exact diagnostic printed on stderr.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type KeylogResult<T> = Result<T, KeylogError>;

#[derive(Debug, Error)]
pub enum KeylogError {
    /// Input line could not be parsed as JSON.
    #[error("Invalid JSON received: {line}")]
    Decode {
        /// The trimmed line as received
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// Opening or appending to the CSV log failed.
    #[error("Error writing to log file: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any failure outside decoding and writing. Ends the run.
    #[error("An unexpected error occurred: {reason}")]
    Unexpected { reason: String },

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl KeylogError {
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected {
            reason: reason.into(),
        }
    }

    /// Whether the processor may keep reading after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Write { .. })
    }
}

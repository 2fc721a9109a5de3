//! Error types for `prompts-lib`.
//!
//! One taxonomy covers the whole conversion engine, whichever key-value
//! engine sits underneath: storage engines map their native errors into the
//! `StoreUnavailable`, `Read`, `Write` and `Transaction` variants.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for prompt library conversion.
#[derive(Error, Debug)]
pub enum PromptError {
    // === Store Errors ===
    /// The store could not be opened or created at the given path.
    #[error("Prompt store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// Beginning or committing a transaction failed.
    #[error("Transaction {operation} failed: {reason}")]
    Transaction {
        operation: &'static str,
        reason: String,
    },

    /// Reading from a table (lookup or cursor step) failed.
    #[error("Failed to read {table}: {reason}")]
    Read { table: &'static str, reason: String },

    /// A table could not be created or written.
    #[error("Failed to write {table}: {reason}")]
    Write { table: &'static str, reason: String },

    // === Stored Data Errors ===
    /// Stored key bytes are not a canonical prompt identity.
    #[error("Malformed key {key}: {reason}")]
    MalformedKey { key: String, reason: String },

    /// A metadata record could not be decoded.
    #[error("Failed to decode metadata stored under {key}: {reason}")]
    MetadataDecode { key: String, reason: String },

    /// A metadata record has no body under its derived key.
    #[error("Body with UUID {uuid} not found")]
    OrphanedMetadata { uuid: String },

    // === Snapshot Errors ===
    /// The snapshot is not a valid JSON collection of prompts.
    #[error("Snapshot parse error: {reason}")]
    SnapshotParse { reason: String },

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File not found at the specified path.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    #[must_use]
    pub fn store_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn read(table: &'static str, reason: impl ToString) -> Self {
        Self::Read {
            table,
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn write(table: &'static str, reason: impl ToString) -> Self {
        Self::Write {
            table,
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn transaction(operation: &'static str, reason: impl ToString) -> Self {
        Self::Transaction {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Whether the error means stored data is inconsistent or corrupt, as
    /// opposed to the store or the input being unreachable.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::MalformedKey { .. } | Self::MetadataDecode { .. } | Self::OrphanedMetadata { .. }
        )
    }
}

/// Result type using `PromptError`.
pub type Result<T> = std::result::Result<T, PromptError>;

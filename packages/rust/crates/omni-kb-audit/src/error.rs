//! Error types for knowledge-base audits.
//!
//! Only structural failures live here. Content-integrity problems (missing or
//! unreadable fragments, duplicate ids, unresolved links) are diagnostics
//! collected into [`crate::ValidationReport`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal audit failure; no report is produced.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The index file structure is invalid (header or row shape).
    #[error("malformed index at row {row}, column '{column}': {message}")]
    MalformedIndex {
        /// 1-based data row, `0` for the header.
        row: usize,
        /// Offending column name (or `*` when the whole row is wrong).
        column: String,
        /// Human-readable detail.
        message: String,
    },
    /// The index file could not be read.
    #[error("failed to read index {}: {source}", path.display())]
    IndexRead {
        /// Index path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The knowledge root is missing or is not a directory.
    #[error("knowledge root {} is unreadable: {reason}", path.display())]
    UnreadableRoot {
        /// Root path.
        path: PathBuf,
        /// Why the root was rejected.
        reason: String,
    },
    /// The caller-supplied deadline elapsed; partial results were discarded.
    #[error("audit timed out after {elapsed_ms} ms")]
    Timeout {
        /// Milliseconds spent before the run was abandoned.
        elapsed_ms: u128,
    },
    /// The bounded worker pool could not be created.
    #[error("failed to build audit worker pool: {0}")]
    WorkerPool(String),
    /// A settings file exists but cannot be parsed.
    #[error("invalid audit settings in {}: {message}", path.display())]
    Settings {
        /// Settings file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl AuditError {
    pub(crate) fn malformed(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self::MalformedIndex {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type AuditResult<T> = Result<T, AuditError>;

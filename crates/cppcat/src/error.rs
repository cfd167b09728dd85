//! Error types for cppcat.
//!
//! Only failures that stop a run are errors. Content problems (malformed
//! entries, consistency findings, broken example links) are reported as
//! diagnostics by the stage that finds them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cppcat operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A document could not be read.
    #[error("failed to read document {path}: {source}")]
    DocumentRead {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An input directory could not be listed.
    #[error("failed to scan input directory {path}: {source}")]
    InputScan {
        /// Directory being listed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Output Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Check Errors ===
    /// Consistency findings were treated as fatal.
    #[error("{count} consistency finding(s) with fail_on_findings enabled")]
    FindingsGate {
        /// Number of error-severity findings.
        count: usize,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for cppcat operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from the file system.
    #[must_use]
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            Self::DocumentRead { .. }
                | Self::InputScan { .. }
                | Self::DirectoryCreate { .. }
                | Self::FileWrite { .. }
                | Self::Io(_)
        )
    }

    /// Check if this error is the findings gate tripping.
    #[must_use]
    pub fn is_findings_gate(&self) -> bool {
        matches!(self, Self::FindingsGate { .. })
    }
}

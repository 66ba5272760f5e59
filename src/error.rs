//! Error types for leakage checking.
//!
//! Only [`CheckError::RootNotFound`] and [`CheckError::Config`] abort a suite
//! run. Every other variant is scoped to a single table and is folded into a
//! failed [`CheckRecord`](crate::validation::CheckRecord) by the suite.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for table loading and suite execution.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A table that the requested mode requires is absent.
    #[error("Table not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The table is readable but cannot provide the composite key.
    #[error("Malformed table {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    /// The suite root does not exist or is not a directory.
    #[error("Root directory not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// Any other read fault.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid checker configuration or manifest.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckError {
    pub(crate) fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        CheckError::MalformedTable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            CheckError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CheckError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// True for errors that invalidate the whole run rather than one check.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckError::RootNotFound { .. } | CheckError::Config(_))
    }
}

/// Result type for leakage checking operations.
pub type Result<T> = std::result::Result<T, CheckError>;

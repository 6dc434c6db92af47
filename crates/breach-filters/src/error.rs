//! Error types for the partitioned filter engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or verifying a filter set
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("corpus source not found: {}", path.display())]
    CorpusNotFound { path: PathBuf },

    #[error("filter file not found: {}", path.display())]
    FilterFileNotFound { path: PathBuf },

    #[error("filter file {} has wrong length: expected {expected} bytes, got {actual}", path.display())]
    FilterSizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("invalid partition scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

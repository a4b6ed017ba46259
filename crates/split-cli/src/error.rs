//! Error types for the royalty-split CLI

use royalty_split_core::{SplitError, StoreError};
use thiserror::Error;

/// CLI-level errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Allocation input was rejected
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Saved split could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

//! Error types for the CLI

use parser::ErrorList;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The input has syntax errors
    #[error("{0}")]
    Parse(ErrorList),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// The input could not be registered in the file set
    #[error("File set error: {0}")]
    FileSet(#[from] core_types::FileSetError),

    /// Diagnostics could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

impl From<ErrorList> for CliError {
    fn from(errors: ErrorList) -> Self {
        CliError::Parse(errors)
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

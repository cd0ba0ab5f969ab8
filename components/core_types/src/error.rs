//! Errors raised while building a source file set.

use thiserror::Error;

/// Reasons a file cannot be registered in a [`SourceFileSet`](crate::SourceFileSet)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSetError {
    /// An explicit base would overlap files already in the set
    #[error("invalid file base {base}: next free base is {next}")]
    BaseTooLow {
        /// Requested base
        base: usize,
        /// Lowest base still available
        next: usize,
    },
    /// The file does not fit in the remaining position space
    #[error("file of {size} bytes at base {base} overflows the position space")]
    Overflow {
        /// Requested base
        base: usize,
        /// Requested size
        size: usize,
    },
}

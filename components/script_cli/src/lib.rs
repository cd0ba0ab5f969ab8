//! Script Parser CLI Library
//!
//! Provides the [`Frontend`] that loads and parses script files, plus the
//! argument definitions and the interactive REPL used by `script-parse`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod frontend;
pub mod repl;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use frontend::Frontend;

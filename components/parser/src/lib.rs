//! Script Parser Component
//!
//! Turns script source into an abstract syntax tree with positioned
//! diagnostics.
//!
//! # Overview
//!
//! - [`Scanner`] - Tokenizes source bytes and inserts soft semicolons
//! - [`Token`] - Token kinds with their spelling and precedence
//! - [`Parser`] - Recursive descent parser with error recovery
//! - [`Expr`] / [`Stmt`] - Abstract Syntax Tree node types
//! - [`ErrorList`] - Sorted, de-duplicated parse errors
//!
//! # Example
//!
//! ```
//! use core_types::SourceFileSet;
//!
//! let source = "sum := func(a, b) { return a + b }";
//! let mut set = SourceFileSet::new();
//! let file = set.add_file("main", None, source.len()).unwrap();
//!
//! let ast = parser::parse(file, source.as_bytes()).unwrap();
//! assert_eq!(ast.stmts.len(), 1);
//! assert_eq!(ast.to_string(), "sum := func(a, b) {return (a + b)}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod literal;
pub mod parser;
pub mod scanner;
pub mod token;

pub use ast::{Expr, File, Node, Stmt, Visitor};
pub use error::{ErrorList, ParseError};
pub use parser::{Parser, MAX_ERRORS, MAX_NESTING_DEPTH};
pub use scanner::{Lexeme, ScanMode, Scanner, TokenSource};
pub use token::Token;

use core_types::SourceFile;
use std::sync::Arc;

/// Parses `src`, the full contents of `file`, with default settings.
///
/// # Errors
///
/// Returns the sorted diagnostics if the source has syntax errors.
///
/// # Panics
///
/// Panics if the length of `src` differs from the size of `file`.
pub fn parse(file: Arc<SourceFile>, src: &[u8]) -> Result<File, ErrorList> {
    Parser::new(file, src).parse_file()
}

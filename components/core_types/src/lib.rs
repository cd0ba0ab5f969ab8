//! Source position tracking shared by the script front end.
//!
//! This crate maps every loaded source file into one integer address space so
//! a single [`Pos`] identifies a location in exactly one file.
//!
//! # Overview
//!
//! - [`Pos`] - Offset into the shared position space
//! - [`SourceFile`] - A file's slice of the space and its line table
//! - [`SourceFileSet`] - Assigns bases and resolves positions across files
//! - [`SourceFilePos`] - A resolved `file:line:column` position
//!
//! # Examples
//!
//! ```
//! use core_types::SourceFileSet;
//!
//! let mut set = SourceFileSet::new();
//! let file = set.add_file("main.s", None, 12).unwrap();
//! file.add_line(6);
//!
//! let pos = file.file_set_pos(8);
//! assert_eq!(set.position(pos).to_string(), "main.s:2:3");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod file_set;
mod source;

pub use error::FileSetError;
pub use file_set::SourceFileSet;
pub use source::{Pos, SourceFile, SourceFilePos};

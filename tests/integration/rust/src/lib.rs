//! Integration test suite for the script front end
//!
//! Helpers shared by the cross-component tests under `tests/`.

use core_types::SourceFileSet;
use parser::{ErrorList, File};

/// Re-export components for test convenience
pub mod components {
    pub use bytecode_system;
    pub use core_types;
    pub use parser;
}

/// Registers `src` in `set` under `name` and parses it.
///
/// # Panics
///
/// Panics if the file set refuses the file.
pub fn parse_in(set: &mut SourceFileSet, name: &str, src: &str) -> Result<File, ErrorList> {
    let file = set
        .add_file(name, None, src.len())
        .expect("file set accepts a new file");
    parser::parse(file, src.as_bytes())
}

/// Parses `src` in a fresh file set and returns its rendering.
///
/// # Panics
///
/// Panics if `src` does not parse.
pub fn render(src: &str) -> String {
    let mut set = SourceFileSet::new();
    match parse_in(&mut set, "render", src) {
        Ok(file) => file.to_string(),
        Err(errors) => panic!("{:?} failed to parse: {}", src, errors),
    }
}

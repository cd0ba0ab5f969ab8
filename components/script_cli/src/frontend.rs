//! Front end orchestration
//!
//! The [`Frontend`] owns one [`SourceFileSet`] so that every file it parses,
//! including REPL entries, lives in a single position space.

use crate::error::{CliError, CliResult};
use core_types::SourceFileSet;
use parser::{ErrorList, File, Parser};
use std::io::{self, Write};
use std::path::Path;

/// Loads sources, parses them and formats the outcome
pub struct Frontend {
    file_set: SourceFileSet,
    /// Whether to print the rendered AST after a successful parse
    print_ast: bool,
    /// Whether diagnostics are printed as JSON
    json: bool,
    /// Whether the grammar-rule trace goes to stderr
    trace: bool,
}

impl Frontend {
    /// Create a front end with an empty file set
    ///
    /// # Example
    /// ```
    /// use script_cli::Frontend;
    ///
    /// let mut frontend = Frontend::new();
    /// let ast = frontend.parse_source("inline", b"x := 1 + 2").unwrap();
    /// assert_eq!(ast.to_string(), "x := (1 + 2)");
    /// ```
    pub fn new() -> Self {
        Self {
            file_set: SourceFileSet::new(),
            print_ast: false,
            json: false,
            trace: false,
        }
    }

    /// Enable AST printing
    pub fn with_print_ast(mut self, enabled: bool) -> Self {
        self.print_ast = enabled;
        self
    }

    /// Print diagnostics as JSON
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Trace every parse to stderr
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Check if AST printing is enabled
    pub fn is_print_ast_enabled(&self) -> bool {
        self.print_ast
    }

    /// Check if JSON diagnostics are enabled
    pub fn is_json_enabled(&self) -> bool {
        self.json
    }

    /// Check if tracing is enabled
    pub fn is_trace_enabled(&self) -> bool {
        self.trace
    }

    /// The set every parsed input is registered in
    pub fn file_set(&self) -> &SourceFileSet {
        &self.file_set
    }

    /// Parse a script file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or has syntax errors
    ///
    /// # Example
    /// ```no_run
    /// use script_cli::Frontend;
    ///
    /// let mut frontend = Frontend::new();
    /// let ast = frontend.parse_file("main.script").unwrap();
    /// ```
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> CliResult<File> {
        let path = path.as_ref();
        let source = std::fs::read(path)?;
        self.parse_source(&path.display().to_string(), &source)
    }

    /// Parse `source` registered under `name`
    ///
    /// # Errors
    /// Returns `CliError::Parse` with every diagnostic if the source has
    /// syntax errors
    pub fn parse_source(&mut self, name: &str, source: &[u8]) -> CliResult<File> {
        let (ast, errors) = self.parse_source_recovering(name, source)?;
        errors.into_result().map_err(CliError::Parse)?;
        Ok(ast)
    }

    /// Parse `source` registered under `name`, keeping the partial tree
    /// alongside any diagnostics
    ///
    /// # Errors
    /// Returns `CliError::FileSet` if the file cannot be registered
    pub fn parse_source_recovering(
        &mut self,
        name: &str,
        source: &[u8],
    ) -> CliResult<(File, ErrorList)> {
        let file = self.file_set.add_file(name, None, source.len())?;
        log::debug!("parsing {} ({} bytes) at base {}", name, source.len(), file.base());

        let parser = Parser::new(file, source);
        Ok(if self.trace {
            parser.with_trace(io::stderr()).parse_file_recovering()
        } else {
            parser.parse_file_recovering()
        })
    }

    /// Write the outcome of a successful parse to `out`
    ///
    /// # Errors
    /// Returns any error raised by `out`
    pub fn report(&self, name: &str, ast: &File, out: &mut impl Write) -> CliResult<()> {
        if self.print_ast {
            writeln!(out, "{}", ast)?;
        } else {
            writeln!(out, "{}: ok ({} statements)", name, ast.stmts.len())?;
        }
        Ok(())
    }

    /// Format diagnostics, one per line or as a JSON array
    ///
    /// # Errors
    /// Returns `CliError::Json` if serialization fails
    pub fn format_errors(&self, errors: &ErrorList) -> CliResult<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(errors)?);
        }
        Ok(errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Start the REPL
    ///
    /// # Errors
    /// Returns `CliError` if the REPL encounters a fatal error
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new()
    }
}

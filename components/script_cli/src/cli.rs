//! Command line arguments

use clap::Parser;

/// Parse script files and report their syntax tree or diagnostics
#[derive(Debug, Parser)]
#[command(name = "script-parse", version, about)]
pub struct Cli {
    /// Script file to parse; repeat to parse several files into one position space
    #[arg(short, long = "file", value_name = "FILE")]
    pub files: Vec<String>,

    /// Parse inline source code
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Start an interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Print the rendered syntax tree of every parsed input
    #[arg(long)]
    pub print_ast: bool,

    /// Write the grammar-rule trace of every parse to stderr
    #[arg(long)]
    pub trace: bool,

    /// Print diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Whether any input was given
    pub fn has_input(&self) -> bool {
        !self.files.is_empty() || self.eval.is_some() || self.repl
    }
}

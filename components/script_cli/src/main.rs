//! Script parser CLI
//!
//! Entry point for `script-parse`. Parses CLI arguments and delegates to the
//! [`Frontend`](script_cli::Frontend) for parsing and reporting.

use clap::Parser as ClapParser;
use script_cli::{Cli, CliError, Frontend};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.has_input() {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let mut frontend = Frontend::new()
        .with_print_ast(cli.print_ast)
        .with_json(cli.json)
        .with_trace(cli.trace);

    let mut failed = false;

    // Every file lands in the same file set, in command line order
    for file in &cli.files {
        let result = frontend.parse_file(file);
        failed |= !handle(&frontend, file, result);
    }

    if let Some(code) = &cli.eval {
        let result = frontend.parse_source("(eval)", code.as_bytes());
        failed |= !handle(&frontend, "(eval)", result);
    }

    if cli.repl {
        if let Err(e) = frontend.repl() {
            eprintln!("Error: {}", e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Print the outcome of one parse; returns whether it succeeded
fn handle(frontend: &Frontend, name: &str, result: Result<parser::File, CliError>) -> bool {
    let outcome = result.and_then(|ast| frontend.report(name, &ast, &mut std::io::stdout()));
    match outcome {
        Ok(()) => true,
        Err(CliError::Parse(errors)) => {
            match frontend.format_errors(&errors) {
                Ok(text) if frontend.is_json_enabled() => println!("{}", text),
                Ok(text) => eprintln!("{}", text),
                Err(e) => eprintln!("Error: {}", e),
            }
            false
        }
        Err(CliError::Io(e)) => {
            eprintln!("Error: Could not read file '{}': {}", name, e);
            false
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

fn print_usage() {
    println!("Script parser v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  script-parse --file <FILE>...   Parse one or more script files");
    println!("  script-parse --eval <CODE>      Parse inline source code");
    println!("  script-parse --repl             Start interactive REPL");
    println!();
    println!("Run 'script-parse --help' for more options.");
}

//! REPL (Read-Parse-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::frontend::Frontend;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Name under which every REPL entry is registered
pub const REPL_FILE_NAME: &str = "(repl)";

/// Reads entries until `exit`, end of input or a terminal failure.
///
/// Each complete entry is parsed as its own file in the front end's file set
/// and its rendered syntax tree, or its diagnostics, are printed.
pub fn run_repl(frontend: &mut Frontend) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Script parser v{}", env!("CARGO_PKG_VERSION"));
    println!("Type statements to see how they parse, or 'exit' to quit.");
    println!();

    let mut line_buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { "> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && is_exit_command(trimmed) {
                    break;
                }

                if !in_multiline && trimmed.starts_with('.') {
                    handle_repl_command(trimmed, frontend);
                    continue;
                }

                if in_multiline {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                if !is_input_complete(&line_buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;

                let _ = editor.add_history_entry(line_buffer.as_str());
                println!("{}", evaluate(frontend, &line_buffer));
                line_buffer.clear();
            }
            // Ctrl-C drops a pending entry
            Err(ReadlineError::Interrupted) => {
                line_buffer.clear();
                in_multiline = false;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Parse one REPL entry and describe the outcome
///
/// A broken entry prints its diagnostics followed by the partial tree the
/// parser recovered, so the user can see where recovery resumed.
pub fn evaluate(frontend: &mut Frontend, input: &str) -> String {
    let (ast, errors) = match frontend.parse_source_recovering(REPL_FILE_NAME, input.as_bytes()) {
        Ok(parsed) => parsed,
        Err(e) => return format!("Error: {}", e),
    };
    if errors.is_empty() {
        return ast.to_string();
    }
    let diagnostics = frontend
        .format_errors(&errors)
        .unwrap_or_else(|e| e.to_string());
    format!("{}\nrecovered: {}", diagnostics, ast)
}

fn is_exit_command(input: &str) -> bool {
    matches!(input, "exit" | "quit" | ".exit")
}

const DOT_COMMANDS: &[(&str, &str)] = &[
    (".help", "list dot commands"),
    (".clear", "clear the terminal"),
    (".files", "count the entries parsed so far"),
    (".exit", "leave (so do exit and quit)"),
];

fn handle_repl_command(command: &str, frontend: &Frontend) {
    match command {
        ".help" => {
            for (name, what) in DOT_COMMANDS {
                println!("  {:<8} {}", name, what);
            }
        }
        ".clear" => print!("\x1B[2J\x1B[1;1H"),
        ".files" => println!("{} entries parsed", frontend.file_set().files().len()),
        _ => println!("unknown command {}, try .help", command),
    }
}

/// Whether every bracket opened in `input` has been closed, ignoring
/// brackets inside string, char and raw string literals.
pub fn is_input_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }

        match quote {
            // raw strings have no escapes
            Some(q) => {
                if c == '\\' && q != '`' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '{' | '[' | '(' => depth += 1,
                '}' | ']' | ')' => depth -= 1,
                _ => {}
            },
        }
    }

    // unbalanced closers are complete input: the parser reports them
    depth <= 0 && quote.is_none()
}

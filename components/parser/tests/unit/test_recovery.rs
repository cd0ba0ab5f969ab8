//! Diagnostics, recovery and the error cap

use core_types::SourceFileSet;
use parser::parser::{MAX_ERRORS, MAX_NESTING_DEPTH};
use parser::{ErrorList, File, Parser, Stmt};

fn parse_recovering(src: &str) -> (File, ErrorList) {
    let mut set = SourceFileSet::new();
    let file = set.add_file("bad.s", None, src.len()).unwrap();
    Parser::new(file, src.as_bytes()).parse_file_recovering()
}

fn errors(src: &str) -> ErrorList {
    let (_, errors) = parse_recovering(src);
    assert!(!errors.is_empty(), "{:?} parsed without errors", src);
    errors
}

#[test]
fn test_pure_garbage_yields_bad_nodes() {
    let (ast, errors) = parse_recovering(")(");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].msg, "expected statement, found ')'");
    assert_eq!(ast.stmts.len(), 1);
    assert!(matches!(ast.stmts[0], Stmt::Bad(_)));
}

#[test]
fn test_stray_closing_brace_is_reported() {
    let errors = errors("a := 1\n}\nb := 2");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].pos.line, 2);
    assert_eq!(errors.as_slice()[0].msg, "expected statement, found '}'");
}

#[test]
fn test_same_line_errors_are_deduplicated() {
    let errors = errors("x := ) + ) * )");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].msg, "expected operand, found ')'");
}

#[test]
fn test_error_cap_on_many_illegal_lines() {
    let src = "@\n".repeat(10_000);
    let errors = errors(&src);
    assert_eq!(errors.len(), MAX_ERRORS);
    let lines: Vec<usize> = errors.iter().map(|e| e.pos.line).collect();
    assert_eq!(lines, (1..=10).collect::<Vec<_>>());
    assert!(errors
        .iter()
        .all(|e| e.msg == "illegal character U+0040 '@'"));
}

#[test]
fn test_error_cap_on_many_syntax_errors() {
    let src = "return )\n".repeat(50);
    let errors = errors(&src);
    assert_eq!(errors.len(), MAX_ERRORS);
}

#[test]
fn test_errors_are_sorted_by_position() {
    let errors = errors("if { }\nreturn )\nx := 'ab'");
    let lines: Vec<usize> = errors.iter().map(|e| e.pos.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_literal_errors_are_reported() {
    let int_errors = errors("x := 99999999999999999999");
    assert_eq!(int_errors.as_slice()[0].msg, "invalid integer literal");

    let escape_errors = errors("x := \"\\q\"");
    assert!(escape_errors.as_slice()[0].msg.contains("escape sequence"));
}

#[test]
fn test_unterminated_block_is_reported() {
    let errors = errors("if x {\n  y := 1\n");
    assert!(errors
        .iter()
        .any(|e| e.msg.starts_with("expected '}'")));
}

#[test]
fn test_simple_statement_where_condition_is_required() {
    let errors = errors("for a := 1; b = 2; a++ {}");
    assert_eq!(
        errors.as_slice()[0].msg,
        "expected condition expression, found assignment"
    );
}

#[test]
fn test_missing_init_in_if() {
    let errors = errors("if ; x {}");
    assert_eq!(errors.as_slice()[0].msg, "missing init in if statement");
}

#[test]
fn test_deep_parentheses_are_cut_off() {
    let errors = errors(&"(".repeat(100_000));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].msg, "expression nested too deeply");
    assert_eq!(errors.as_slice()[0].pos.line, 1);
}

#[test]
fn test_deep_unary_chain_is_cut_off() {
    let src = format!("x := {}a", "!".repeat(100_000));
    let (ast, errors) = parse_recovering(&src);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].msg, "expression nested too deeply");
    assert_eq!(ast.stmts.len(), 1);
}

#[test]
fn test_deep_blocks_are_cut_off() {
    let errors = errors(&"if a {\n".repeat(100_000));
    assert!(errors.len() <= MAX_ERRORS);
    // the limit is reached in the condition of the innermost `if`
    assert!(errors.as_slice()[0].msg.ends_with("nested too deeply"));
}

#[test]
fn test_nesting_below_the_limit_parses() {
    let depth = MAX_NESTING_DEPTH / 2;
    let src = format!("x := {}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut set = SourceFileSet::new();
    let file = set.add_file("ok.s", None, src.len()).unwrap();
    let ast = Parser::new(file, src.as_bytes()).parse_file().unwrap();
    assert_eq!(ast.stmts.len(), 1);
}

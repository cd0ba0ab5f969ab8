//! End-to-end parses of representative programs

use core_types::SourceFileSet;
use parser::ast::{ExprStmt, ForInStmt, IfStmt};
use parser::{Expr, File, Stmt, Token};

fn parse(src: &str) -> File {
    let mut set = SourceFileSet::new();
    let file = set.add_file("scenario", None, src.len()).unwrap();
    match parser::parse(file, src.as_bytes()) {
        Ok(ast) => ast,
        Err(errors) => panic!("{:?} failed to parse: {}", src, errors),
    }
}

fn only_stmt(ast: &File) -> &Stmt {
    assert_eq!(ast.stmts.len(), 1, "expected one statement in {}", ast);
    &ast.stmts[0]
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let ast = parse("a := 1 + 2 * 3");
    let Stmt::Assign(assign) = only_stmt(&ast) else {
        panic!("expected assignment");
    };
    assert_eq!(assign.token, Token::Define);
    assert_eq!(assign.rhs[0].to_string(), "(1 + (2 * 3))");
}

#[test]
fn test_else_if_is_a_nested_if() {
    let ast = parse("if x { y() } else if z { w() }");
    let Stmt::If(IfStmt { else_stmt, cond, .. }) = only_stmt(&ast) else {
        panic!("expected if");
    };
    assert_eq!(cond.to_string(), "x");
    let Some(Stmt::If(inner)) = else_stmt.as_deref() else {
        panic!("else branch should be an if statement");
    };
    assert_eq!(inner.cond.to_string(), "z");
    assert!(inner.else_stmt.is_none());
}

#[test]
fn test_for_in_binds_key_and_value() {
    let ast = parse("for k, v in items { }");
    let Stmt::ForIn(ForInStmt {
        key,
        value,
        iterable,
        body,
        ..
    }) = only_stmt(&ast)
    else {
        panic!("expected for-in");
    };
    assert_eq!(key.name, "k");
    assert_eq!(value.name, "v");
    assert!(matches!(iterable, Expr::Ident(id) if id.name == "items"));
    assert!(body.stmts.is_empty());
}

#[test]
fn test_for_in_value_only_uses_placeholder_key() {
    let ast = parse("for v in items { }");
    let Stmt::ForIn(for_in) = only_stmt(&ast) else {
        panic!("expected for-in");
    };
    assert_eq!(for_in.key.name, "_");
    assert_eq!(for_in.value.name, "v");
}

#[test]
fn test_trailing_comma_in_call() {
    let ast = parse("f(1, 2,)");
    let Stmt::Expr(ExprStmt {
        expr: Expr::Call(call),
    }) = only_stmt(&ast)
    else {
        panic!("expected call statement");
    };
    assert_eq!(call.args.len(), 2);
    assert!(call.ellipsis.is_none());
}

#[test]
fn test_program_with_every_statement_kind() {
    let src = r#"
math := import("math")
counter := 0
add := func(a, b) { return a + b }
for i := 0; i < 10; i++ {
    if i % 2 == 0 { continue }
    counter += add(i, 1)
}
for k, v in math {
    if k == "a" { break } else { counter-- }
}
err := error("bad")
frozen := immutable([1, 2, 3])
x := counter > 3 ? "big" : undefined
export {counter: counter, ratio: 1.5, c: 'c'}
"#;
    let ast = parse(src);
    assert_eq!(ast.stmts.len(), 9);
    assert!(matches!(ast.stmts[3], Stmt::For(_)));
    assert!(matches!(ast.stmts[4], Stmt::ForIn(_)));
    assert!(matches!(ast.stmts[8], Stmt::Export(_)));
}

#[test]
fn test_comments_are_ignored() {
    let ast = parse("a := 1 // one\n/* block\ncomment */ b := 2");
    assert_eq!(ast.to_string(), "a := 1; b := 2");
}

#[test]
fn test_map_braces_after_control_keyword_open_the_body() {
    let ast = parse("for x { y := {} }");
    let Stmt::For(for_stmt) = only_stmt(&ast) else {
        panic!("expected for");
    };
    assert_eq!(for_stmt.cond.as_ref().map(ToString::to_string).as_deref(), Some("x"));
    assert_eq!(for_stmt.body.stmts.len(), 1);
}

#[test]
fn test_labelled_branch() {
    let ast = parse("for { break outer }");
    assert_eq!(ast.to_string(), "for {break outer}");
}

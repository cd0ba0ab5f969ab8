//! Node positions: ordering, last-child ends and the shared position space

use core_types::{Pos, SourceFileSet};
use parser::ast::{walk_expr, walk_stmt, Ident};
use parser::{Expr, File, Node, Stmt, Visitor};
use proptest::prelude::*;

/// Checks every node it visits and counts them.
#[derive(Default)]
struct PositionChecker {
    nodes: usize,
    failures: Vec<String>,
}

impl PositionChecker {
    fn check(&mut self, what: &str, node: &dyn Node) {
        self.nodes += 1;
        if node.end() < node.pos() {
            self.failures
                .push(format!("{} {} ends at {} before {}", what, node, node.end(), node.pos()));
        }
    }

    fn expect_end(&mut self, what: &str, node: &dyn Node, last_child: Pos) {
        if node.end() != last_child {
            self.failures.push(format!(
                "{} {} ends at {} instead of {}",
                what,
                node,
                node.end(),
                last_child
            ));
        }
    }
}

impl Visitor for PositionChecker {
    fn visit_expr(&mut self, expr: &Expr) {
        self.check("expression", expr);
        match expr {
            Expr::Binary(e) => self.expect_end("binary", expr, e.rhs.end()),
            Expr::Unary(e) => self.expect_end("unary", expr, e.expr.end()),
            Expr::Cond(e) => self.expect_end("conditional", expr, e.false_expr.end()),
            Expr::FuncLit(e) => self.expect_end("function", expr, e.body.end()),
            Expr::Selector(e) => self.expect_end("selector", expr, e.sel.end()),
            _ => {}
        }
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.check("statement", stmt);
        match stmt {
            Stmt::Expr(s) => self.expect_end("expression statement", stmt, s.expr.end()),
            Stmt::Assign(s) => {
                if let Some(last) = s.rhs.last() {
                    self.expect_end("assignment", stmt, last.end());
                }
            }
            Stmt::Return(s) => {
                if let Some(result) = &s.result {
                    self.expect_end("return", stmt, result.end());
                }
            }
            Stmt::Export(s) => self.expect_end("export", stmt, s.result.end()),
            Stmt::ForIn(s) => self.expect_end("for-in", stmt, s.body.end()),
            Stmt::If(s) => {
                let last = match &s.else_stmt {
                    Some(else_stmt) => else_stmt.end(),
                    None => s.body.end(),
                };
                self.expect_end("if", stmt, last);
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }
}

fn parse(set: &mut SourceFileSet, name: &str, src: &str) -> File {
    let file = set.add_file(name, None, src.len()).unwrap();
    parser::parse(file, src.as_bytes()).unwrap()
}

fn check_tree(ast: &File) -> PositionChecker {
    let mut checker = PositionChecker::default();
    for stmt in &ast.stmts {
        checker.visit_stmt(stmt);
    }
    checker
}

const PROGRAM: &str = r#"
fib := func(n) {
    if n < 2 { return n }
    return fib(n - 1) + fib(n - 2)
}
cache := {hits: 0, "miss count": 0}
for i := 0; i < 10; i++ {
    cache.hits += 1
}
for k, v in cache {
    if v > 3 { break } else if v == 2 { continue } else { v-- }
}
pick := len(cache) > 1 ? cache[:1] : [cache.hits, -1, !true]
export {fib: fib, pick: immutable(pick), err: error("x"), os: import("os")}
"#;

#[test]
fn test_every_node_ends_after_it_starts() {
    let mut set = SourceFileSet::new();
    let ast = parse(&mut set, "program", PROGRAM);
    let checker = check_tree(&ast);
    assert!(checker.nodes > 50, "only {} nodes visited", checker.nodes);
    assert!(checker.failures.is_empty(), "{:#?}", checker.failures);
}

#[test]
fn test_node_positions_resolve_to_source_text() {
    let mut set = SourceFileSet::new();
    let src = "total := price * count";
    let ast = parse(&mut set, "calc", src);
    let Stmt::Assign(assign) = &ast.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::Binary(mul) = &assign.rhs[0] else {
        panic!("expected binary expression");
    };
    let file = &ast.input_file;
    let text = |node: &dyn Node| &src[file.offset(node.pos())..file.offset(node.end())];
    assert_eq!(text(&assign.lhs[0]), "total");
    assert_eq!(text(&assign.rhs[0]), "price * count");
    assert_eq!(text(mul.lhs.as_ref()), "price");
    assert_eq!(file.offset(mul.token_pos), 15);
}

/// Collects every identifier with its source text.
#[derive(Default)]
struct NameCollector {
    names: Vec<String>,
}

impl Visitor for NameCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        self.names.push(ident.name.clone());
    }
}

#[test]
fn test_visitor_reaches_every_identifier() {
    let mut set = SourceFileSet::new();
    let ast = parse(
        &mut set,
        "names",
        "f := func(a, b) { for k, v in a { x := b.c } }",
    );
    let mut collector = NameCollector::default();
    ast.stmts.iter().for_each(|s| collector.visit_stmt(s));
    // the selector field `c` is a string key
    assert_eq!(collector.names, vec!["f", "a", "b", "k", "v", "a", "x", "b"]);
}

#[test]
fn test_files_share_one_position_space() {
    let mut set = SourceFileSet::new();
    let first = parse(&mut set, "first.s", "a := 1\nb := 2");
    let second = parse(&mut set, "second.s", "c := 3");

    assert!(second.pos() > first.end());
    let b = first.stmts[1].pos();
    let c = second.stmts[0].pos();
    assert_eq!(set.position(b).to_string(), "first.s:2:1");
    assert_eq!(set.position(c).to_string(), "second.s:1:1");
    assert_eq!(
        set.file(c).map(|f| f.name().to_string()).as_deref(),
        Some("second.s")
    );
}

#[test]
fn test_bad_nodes_stay_inside_the_file() {
    let mut set = SourceFileSet::new();
    let src = "if a := 1 {}\nfor ; b = 2; {}";
    let file = set.add_file("bad", None, src.len()).unwrap();
    let (ast, errors) = parser::Parser::new(file.clone(), src.as_bytes()).parse_file_recovering();
    assert_eq!(errors.len(), 2);
    let checker = check_tree(&ast);
    assert!(checker.failures.is_empty(), "{:#?}", checker.failures);
    for stmt in &ast.stmts {
        assert!(file.contains(stmt.pos()));
        assert!(file.contains(stmt.end()));
    }
}

proptest! {
    #[test]
    fn prop_statement_lists_keep_positions_ordered(
        values in proptest::collection::vec(0u32..10_000, 1..20)
    ) {
        let src: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("v{} := {} + v\n", i, v))
            .collect();
        let mut set = SourceFileSet::new();
        let ast = parse(&mut set, "gen", &src);
        prop_assert_eq!(ast.stmts.len(), values.len());
        for pair in ast.stmts.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].pos());
        }
        for (line, stmt) in ast.stmts.iter().enumerate() {
            prop_assert_eq!(set.position(stmt.pos()).line, line + 1);
        }
    }
}

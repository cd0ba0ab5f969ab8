//! Render, re-parse, render again: the two renders must agree

use core_types::SourceFileSet;
use proptest::prelude::*;

fn render(src: &str) -> Result<String, String> {
    let mut set = SourceFileSet::new();
    let file = set
        .add_file("render", None, src.len())
        .map_err(|e| e.to_string())?;
    parser::parse(file, src.as_bytes())
        .map(|ast| ast.to_string())
        .map_err(|e| e.to_string())
}

fn assert_idempotent(src: &str) {
    let first = render(src).unwrap_or_else(|e| panic!("{:?}: {}", src, e));
    let second = render(&first).unwrap_or_else(|e| panic!("re-parse of {:?}: {}", first, e));
    assert_eq!(first, second, "source: {:?}", src);
}

const CORPUS: &[&str] = &[
    "a := 1 + 2 * 3",
    "x = -a * (b + c) / ^d % !e",
    "a, b = 1, 2",
    "a += 1; b -= 2; c *= 3; d /= 4; e %= 5; f &= 6; g |= 7; h ^= 8; i <<= 9; j >>= 1; k &^= 2",
    "i++; j--",
    "x := (a)",
    "x := ((a + b))",
    "x := a ? b : c ? d : e",
    "x := (a ? b : c) + 1",
    "x := a && b || !c && d != e",
    "x := a << 2 >> 1 & 3 | 4 ^ 5 &^ 6",
    "x := 1.5e3 + .5 + 0x1F + 017",
    r#"s := "tab\there" + `raw\n` + 'c' + '\n'"#,
    "x := [1, [2, 3], []]",
    r#"m := {a: 1, "b c": 2, "if": 3, "": 4, nested: {k: [true, false, undefined]}}"#,
    "v := m.a.b[1][2:3][:4][5:][:]",
    "f(1, 2,)",
    "f(a, rest...)",
    "g := func() {}",
    "g := func(a, b, ...c) {x := a; return b}",
    "h := func(a)",
    "r := func() { return func(x) { return x * 2 } }()",
    r#"os := import("os"); path := import("dir/\"quoted\"")"#,
    "e := error(\"oops\"); i := immutable({a: [1]})",
    "if a {}",
    "if a := f(); a > 1 { b() } else if c { d() } else { e() }",
    "for {}",
    "for x < 3 { x++ }",
    "for i := 0; i < 3; i++ { continue }",
    "for i := 0; ; i++ { break }",
    "for ; i < 3; { i++ }",
    "for i := 0; i < 3; { i++ }",
    "for k, v in items { sum += v }",
    "for v in items {}",
    "for { break outer; continue inner }",
    "a; ; b",
    ";",
    "f := func() { return }",
    "export {a: 1}",
    "x := a.b(c)[d]",
];

#[test]
fn test_corpus_render_is_idempotent() {
    for src in CORPUS {
        assert_idempotent(src);
    }
}

#[test]
fn test_render_shapes() {
    let cases = [
        ("a := 1 + 2 * 3", "a := (1 + (2 * 3))"),
        ("if a := f(); a {}", "if a := f(); a {}"),
        ("for ; i < 3; {}", "for (i < 3) {}"),
        ("for i := 0; i < 3; {}", "for i := 0; (i < 3); {}"),
        ("x := import(\"os\")", "x := import(\"os\")"),
        ("x := (-a)", "x := (-a)"),
        ("x := ((a))", "x := ((a))"),
        ("m := {\"k\": 1, \"for\": 2}", "m := {k: 1, \"for\": 2}"),
        ("a\nb\n", "a; b"),
    ];
    for (src, want) in cases {
        assert_eq!(render(src).as_deref(), Ok(want), "source: {:?}", src);
    }
}

/// Random well-formed expressions built from a small grammar
fn expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop::sample::select(vec!["a", "b", "foo", "bar_1", "true", "undefined"])
            .prop_map(str::to_string),
        (0u32..1000).prop_map(|n| n.to_string()),
        "[a-z ]{0,6}".prop_map(|s| format!("{:?}", s)),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        let binary_op = prop::sample::select(vec![
            "+", "-", "*", "/", "%", "<", ">=", "==", "!=", "&&", "||", "&", "|", "^", "<<", "&^",
        ]);
        prop_oneof![
            (inner.clone(), binary_op, inner.clone())
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            (prop::sample::select(vec!["-", "!", "^", "+"]), inner.clone())
                .prop_map(|(op, e)| format!("{}({})", op, e)),
            inner.clone().prop_map(|e| format!("({})", e)),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, f)| format!("({} ? {} : {})", c, t, f)),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|args| format!("f({})", args.join(", "))),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|items| format!("[{}]", items.join(", "))),
            inner.prop_map(|e| format!("m[{}]", e)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_generated_expressions_render_idempotently(e in expr()) {
        let src = format!("x := {}", e);
        let first = render(&src);
        prop_assert!(first.is_ok(), "{:?} failed: {:?}", src, first);
        let first = first.unwrap_or_default();
        prop_assert_eq!(render(&first), Ok(first.clone()));
    }

    #[test]
    fn prop_arbitrary_input_never_panics(src in "[a-z0-9 (){}\\[\\]+*:=,.;?!\n\"'`@-]{0,48}") {
        let mut set = SourceFileSet::new();
        let file = set.add_file("fuzz", None, src.len()).unwrap();
        let (_, errors) = parser::Parser::new(file, src.as_bytes()).parse_file_recovering();
        prop_assert!(errors.len() <= parser::parser::MAX_ERRORS);
        for err in &errors {
            prop_assert!(err.pos.line >= 1);
        }
    }
}

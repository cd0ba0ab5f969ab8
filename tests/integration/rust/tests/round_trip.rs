//! Rendered ASTs parse back to the same rendering

use integration_tests::render;
use proptest::prelude::*;

const PROGRAMS: &[&str] = &[
    "a := 1 + 2 * 3",
    "f := func(a, b...) { return a + len(b) }",
    "m := {a: 1, \"b c\": [1, 2.5, 'x']}",
    "if x := f(); x > 0 { y = x } else if x < 0 { y = -x } else { y = 0 }",
    "for i := 0; i < 10; i++ { if i % 2 == 0 { continue } }",
    "for k, v in m { out[k] = v }",
    "e := error(\"boom\"); c := immutable([1, 2]); s := arr[1:]",
    "t := a ? b : c ? d : e",
    "os := import(\"os\")\nexport os.name",
];

#[test]
fn test_render_is_a_fixed_point() {
    for src in PROGRAMS {
        let once = render(src);
        assert_eq!(render(&once), once, "source: {}", src);
    }
}

#[test]
fn test_render_makes_precedence_explicit() {
    assert_eq!(render("a := 1 + 2 * 3"), "a := (1 + (2 * 3))");
    assert_eq!(render("a := (1 + 2) * 3"), "a := ((1 + 2) * 3)");
}

fn operand() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,3}".prop_filter("keyword", |s| !matches!(s.as_str(), "if" | "in" | "for")),
        (0u32..1000).prop_map(|n| n.to_string()),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    operand().prop_recursive(4, 32, 2, |inner| {
        let ops = prop::sample::select(vec!["+", "-", "*", "/", "%", "==", "<", "&&", "||", "<<", "&^"]);
        prop_oneof![
            (inner.clone(), ops, inner.clone()).prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            inner.clone().prop_map(|e| format!("!{}", e)),
            inner.clone().prop_map(|e| format!("f({})", e)),
            inner.prop_map(|e| format!("({})", e)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_expression_rendering_round_trips(expr in expression()) {
        let once = render(&format!("x := {}", expr));
        prop_assert_eq!(render(&once), once);
    }
}

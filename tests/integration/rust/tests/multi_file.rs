//! Several files parsed into one position space

use core_types::SourceFileSet;
use integration_tests::parse_in;
use parser::Node;

#[test]
fn test_positions_resolve_to_their_own_file() {
    let mut set = SourceFileSet::new();
    let lib = parse_in(&mut set, "lib.s", "export func(x) {\n  return x * 2\n}\n").unwrap();
    let main = parse_in(&mut set, "main.s", "double := import(\"lib\")\n\nout := double(21)\n").unwrap();

    let lib_pos = set.position(lib.stmts[0].pos());
    assert_eq!(lib_pos.filename, "lib.s");
    assert_eq!((lib_pos.line, lib_pos.column), (1, 1));

    let out = set.position(main.stmts[1].pos());
    assert_eq!(out.filename, "main.s");
    assert_eq!((out.line, out.column), (3, 1));

    // every node of the second file sits after the first file
    assert!(main.pos().0 > lib.end().0);
    assert!(set.file(main.stmts[0].pos()).map_or(false, |f| f.name() == "main.s"));
}

#[test]
fn test_errors_name_the_failing_file() {
    let mut set = SourceFileSet::new();
    parse_in(&mut set, "good.s", "a := 1\n").unwrap();
    let errors = parse_in(&mut set, "bad.s", "a := 1\nb := (1\n").unwrap_err();

    let first = &errors.as_slice()[0];
    assert_eq!(first.pos.filename, "bad.s");
    assert_eq!(first.pos.line, 2);
}

#[test]
fn test_bases_are_reserved_past_each_file() {
    let mut set = SourceFileSet::new();
    let sizes = [0usize, 5, 17];
    for (i, size) in sizes.iter().enumerate() {
        let src = " ".repeat(*size);
        parse_in(&mut set, &format!("f{}", i), &src).unwrap();
    }

    let files = set.files();
    assert_eq!(files.len(), 3);
    for pair in files.windows(2) {
        assert!(pair[1].base() > pair[0].base() + pair[0].size());
    }
}

//! Unit and property tests for SourceFileSet

use core_types::{FileSetError, Pos, SourceFileSet};
use proptest::prelude::*;

#[test]
fn test_resolves_across_files() {
    let mut set = SourceFileSet::new();
    let a = set.add_file("a.s", None, 8).unwrap();
    a.add_line(4);
    let b = set.add_file("b.s", None, 8).unwrap();
    b.add_line(2);

    let pos = set.position(a.file_set_pos(5));
    assert_eq!(pos.to_string(), "a.s:2:2");

    let pos = set.position(b.file_set_pos(0));
    assert_eq!(pos.to_string(), "b.s:1:1");

    let pos = set.position(b.file_set_pos(3));
    assert_eq!(pos.to_string(), "b.s:2:2");
}

#[test]
fn test_alternating_lookups_use_correct_file() {
    let mut set = SourceFileSet::new();
    let a = set.add_file("a", None, 3).unwrap();
    let b = set.add_file("b", None, 3).unwrap();
    for _ in 0..3 {
        assert_eq!(set.file(a.file_set_pos(1)).unwrap().name(), "a");
        assert_eq!(set.file(b.file_set_pos(1)).unwrap().name(), "b");
    }
}

#[test]
fn test_gap_between_explicit_bases_is_unresolvable() {
    let mut set = SourceFileSet::new();
    set.add_file("a", None, 3).unwrap();
    set.add_file("b", Some(50), 3).unwrap();
    assert!(set.file(Pos(20)).is_none());
    assert_eq!(set.position(Pos(20)).to_string(), "-");
}

#[test]
fn test_rejected_file_does_not_advance_base() {
    let mut set = SourceFileSet::new();
    set.add_file("a", None, 3).unwrap();
    let next = set.next_base();
    assert!(matches!(
        set.add_file("b", Some(1), 3),
        Err(FileSetError::BaseTooLow { .. })
    ));
    assert_eq!(set.next_base(), next);
    assert_eq!(set.files().len(), 1);
}

proptest! {
    #[test]
    fn prop_auto_bases_strictly_increase(sizes in proptest::collection::vec(0usize..10_000, 1..40)) {
        let mut set = SourceFileSet::new();
        let files: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| set.add_file(format!("f{}", i), None, size).unwrap())
            .collect();

        for pair in files.windows(2) {
            prop_assert!(pair[1].base() > pair[0].base() + pair[0].size());
        }
    }

    #[test]
    fn prop_every_position_resolves_to_its_file(sizes in proptest::collection::vec(0usize..200, 1..10)) {
        let mut set = SourceFileSet::new();
        let files: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| set.add_file(format!("f{}", i), None, size).unwrap())
            .collect();

        for file in &files {
            for offset in 0..=file.size() {
                let pos = file.file_set_pos(offset);
                let found = set.file(pos).unwrap();
                prop_assert_eq!(found.name(), file.name());
                prop_assert_eq!(set.position(pos).offset, offset);
            }
        }
    }
}

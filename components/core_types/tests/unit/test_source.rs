//! Unit tests for Pos, SourceFile and SourceFilePos

use core_types::{Pos, SourceFilePos, SourceFileSet};

#[cfg(test)]
mod pos_tests {
    use super::*;

    #[test]
    fn test_no_pos_is_invalid() {
        assert!(!Pos::NO_POS.is_valid());
        assert_eq!(Pos::default(), Pos::NO_POS);
    }

    #[test]
    fn test_pos_ordering() {
        assert!(Pos(3) < Pos(4));
        assert_eq!(Pos(3) + 2, Pos(5));
    }
}

#[cfg(test)]
mod source_file_tests {
    use super::*;

    fn file_with_lines(src: &str) -> std::sync::Arc<core_types::SourceFile> {
        let mut set = SourceFileSet::new();
        let file = set.add_file("test", None, src.len()).unwrap();
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                file.add_line(i + 1);
            }
        }
        file
    }

    #[test]
    fn test_first_line_starts_at_zero() {
        let file = file_with_lines("");
        assert_eq!(file.lines(), vec![0]);
        assert_eq!(file.line_count(), 1);
    }

    #[test]
    fn test_position_of_every_byte() {
        let src = "x := 1\nif x {\n  y()\n}";
        let file = file_with_lines(src);
        assert_eq!(file.line_count(), 4);

        let pos = file.position(file.file_set_pos(src.find('y').unwrap()));
        assert_eq!((pos.line, pos.column), (3, 3));

        let pos = file.position(file.file_set_pos(src.len() - 1));
        assert_eq!((pos.line, pos.column), (4, 1));
    }

    #[test]
    fn test_end_of_file_position_is_resolvable() {
        let src = "abc";
        let file = file_with_lines(src);
        let pos = file.position(file.file_set_pos(3));
        assert_eq!((pos.line, pos.column), (1, 4));
    }

    #[test]
    fn test_no_pos_resolves_to_empty() {
        let file = file_with_lines("abc");
        assert_eq!(file.position(Pos::NO_POS), SourceFilePos::default());
    }

    #[test]
    fn test_offset_round_trip() {
        let file = file_with_lines("hello\nworld");
        for offset in 0..=file.size() {
            assert_eq!(file.offset(file.file_set_pos(offset)), offset);
        }
    }

    #[test]
    #[should_panic(expected = "illegal file offset")]
    fn test_file_set_pos_past_end_panics() {
        let file = file_with_lines("abc");
        file.file_set_pos(4);
    }
}

//! Source positions and per-file line tables.
//!
//! Every file loaded into a [`SourceFileSet`](crate::SourceFileSet) occupies its
//! own range of one shared integer address space. A [`Pos`] is an offset into
//! that space; a [`SourceFile`] knows its slice of the space and can turn a
//! `Pos` back into a line and column.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;

/// Offset into the shared, multi-file position space.
///
/// `Pos(0)` is reserved and means "no position".
///
/// # Examples
///
/// ```
/// use core_types::Pos;
///
/// assert!(!Pos::NO_POS.is_valid());
/// assert!(Pos(1).is_valid());
/// assert_eq!(Pos(4) + 3, Pos(7));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos(pub usize);

impl Pos {
    /// The reserved "no position" value
    pub const NO_POS: Pos = Pos(0);

    /// Whether this position refers to an actual location
    pub fn is_valid(self) -> bool {
        self != Pos::NO_POS
    }
}

impl std::ops::Add<usize> for Pos {
    type Output = Pos;

    fn add(self, rhs: usize) -> Pos {
        Pos(self.0 + rhs)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved position: file name, byte offset within the file, line and column.
///
/// Lines and columns are 1-based; a line of 0 marks an unresolved position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceFilePos {
    /// File name, may be empty
    pub filename: String,
    /// Byte offset from the start of the file
    pub offset: usize,
    /// Line number, starting at 1
    pub line: usize,
    /// Column number (byte count), starting at 1
    pub column: usize,
}

impl SourceFilePos {
    /// Whether the position has a line number
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceFilePos {
    /// Renders `file:line:column`, `line:column`, `file` or `-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = self.filename.clone();
        if self.is_valid() {
            if !s.is_empty() {
                s.push(':');
            }
            s.push_str(&self.line.to_string());
            if self.column != 0 {
                s.push(':');
                s.push_str(&self.column.to_string());
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        f.write_str(&s)
    }
}

/// One input file mapped into the shared position space.
///
/// The line table is filled in while the file is scanned and is read-only
/// afterwards. It sits behind a lock so a file can be shared between the
/// scanner that fills it and the file set that resolves positions against it.
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    base: usize,
    size: usize,
    lines: RwLock<Vec<usize>>,
}

impl SourceFile {
    pub(crate) fn new(name: impl Into<String>, base: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            base,
            size,
            lines: RwLock::new(vec![0]),
        }
    }

    /// File name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First position of the file in the shared space
    pub fn base(&self) -> usize {
        self.base
    }

    /// Length of the file in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of lines registered so far
    pub fn line_count(&self) -> usize {
        self.lines.read().len()
    }

    /// Snapshot of the registered line-start offsets
    pub fn lines(&self) -> Vec<usize> {
        self.lines.read().clone()
    }

    /// Registers the start offset of a new line.
    ///
    /// Offsets that do not advance past the last registered line, or that lie
    /// at or beyond the end of the file, are ignored.
    pub fn add_line(&self, offset: usize) {
        let mut lines = self.lines.write();
        let advances = lines.last().map_or(true, |&last| last < offset);
        if advances && offset < self.size {
            lines.push(offset);
        }
    }

    /// Position of the first byte of `line` (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `line` is 0 or greater than [`line_count`](Self::line_count).
    pub fn line_start(&self, line: usize) -> Pos {
        let lines = self.lines.read();
        assert!(line >= 1, "illegal line number (line numbering starts at 1)");
        assert!(
            line <= lines.len(),
            "illegal line number {} (file has {} lines)",
            line,
            lines.len()
        );
        Pos(self.base + lines[line - 1])
    }

    /// Converts a file-relative byte offset into a [`Pos`].
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the file.
    pub fn file_set_pos(&self, offset: usize) -> Pos {
        assert!(
            offset <= self.size,
            "illegal file offset {} (file size is {})",
            offset,
            self.size
        );
        Pos(self.base + offset)
    }

    /// Converts a [`Pos`] into a file-relative byte offset.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not fall inside this file.
    pub fn offset(&self, pos: Pos) -> usize {
        assert!(
            self.contains(pos),
            "illegal position {} (file spans {}..={})",
            pos,
            self.base,
            self.base + self.size
        );
        pos.0 - self.base
    }

    /// Whether `pos` falls inside this file, end-of-file position included
    pub fn contains(&self, pos: Pos) -> bool {
        pos.0 >= self.base && pos.0 <= self.base + self.size
    }

    /// Clamps `pos` to the end-of-file position when it lies outside the file.
    ///
    /// Used for synthetic positions attached to error-recovery nodes.
    pub fn safe_pos(&self, pos: Pos) -> Pos {
        if self.contains(pos) {
            pos
        } else {
            Pos(self.base + self.size)
        }
    }

    /// Resolves `pos` into file name, line and column.
    ///
    /// `Pos::NO_POS` resolves to an empty [`SourceFilePos`].
    ///
    /// # Panics
    ///
    /// Panics if a valid `pos` does not fall inside this file.
    pub fn position(&self, pos: Pos) -> SourceFilePos {
        if !pos.is_valid() {
            return SourceFilePos::default();
        }
        let offset = self.offset(pos);
        let (line, column) = self.unpack(offset);
        SourceFilePos {
            filename: self.name.clone(),
            offset,
            line,
            column,
        }
    }

    fn unpack(&self, offset: usize) -> (usize, usize) {
        let lines = self.lines.read();
        // index of the last line starting at or before `offset`
        let i = lines.partition_point(|&start| start <= offset).saturating_sub(1);
        (i + 1, offset - lines[i] + 1)
    }
}

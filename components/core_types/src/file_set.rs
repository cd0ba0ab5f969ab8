//! The shared position space that all loaded source files are mapped into.

use crate::error::FileSetError;
use crate::source::{Pos, SourceFile, SourceFilePos};
use parking_lot::Mutex;
use std::sync::Arc;

/// An ordered collection of source files sharing one position space.
///
/// Files receive non-overlapping base offsets: each new file starts one past
/// the end of the previous one, the extra slot being the previous file's
/// end-of-file position. Position 0 is never handed out.
///
/// Registration needs `&mut self`; sharing a set between several parsers
/// running in parallel therefore requires an external lock around
/// [`add_file`](Self::add_file).
///
/// # Examples
///
/// ```
/// use core_types::{Pos, SourceFileSet};
///
/// let mut set = SourceFileSet::new();
/// let a = set.add_file("a.s", None, 10).unwrap();
/// let b = set.add_file("b.s", None, 4).unwrap();
/// assert_eq!(a.base(), 1);
/// assert_eq!(b.base(), 12);
/// assert_eq!(set.position(Pos(13)).to_string(), "b.s:1:2");
/// ```
#[derive(Debug)]
pub struct SourceFileSet {
    base: usize,
    files: Vec<Arc<SourceFile>>,
    last_file: Mutex<Option<Arc<SourceFile>>>,
}

impl SourceFileSet {
    /// Creates an empty set; the first file starts at position 1.
    pub fn new() -> Self {
        Self {
            base: 1,
            files: Vec::new(),
            last_file: Mutex::new(None),
        }
    }

    /// The base the next auto-placed file will receive
    pub fn next_base(&self) -> usize {
        self.base
    }

    /// Files registered so far, ordered by base
    pub fn files(&self) -> &[Arc<SourceFile>] {
        &self.files
    }

    /// Registers a new file of `size` bytes.
    ///
    /// With `base == None` the file is placed at [`next_base`](Self::next_base).
    /// An explicit base must not be lower than that.
    ///
    /// # Errors
    ///
    /// Returns [`FileSetError::BaseTooLow`] for an explicit base that would
    /// overlap an existing file and [`FileSetError::Overflow`] when the
    /// position space is exhausted.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        base: Option<usize>,
        size: usize,
    ) -> Result<Arc<SourceFile>, FileSetError> {
        let base = base.unwrap_or(self.base);
        if base < self.base {
            return Err(FileSetError::BaseTooLow {
                base,
                next: self.base,
            });
        }
        let next = base
            .checked_add(size)
            .and_then(|end| end.checked_add(1))
            .ok_or(FileSetError::Overflow { base, size })?;

        let file = Arc::new(SourceFile::new(name, base, size));
        log::trace!("registered {:?} at base {} ({} bytes)", file.name(), base, size);
        self.base = next;
        self.files.push(Arc::clone(&file));
        *self.last_file.lock() = Some(Arc::clone(&file));
        Ok(file)
    }

    /// Returns the file containing `pos`, or `None` for `Pos::NO_POS` and
    /// positions outside every registered file.
    pub fn file(&self, pos: Pos) -> Option<Arc<SourceFile>> {
        if !pos.is_valid() {
            return None;
        }
        let mut last = self.last_file.lock();
        if let Some(file) = last.as_ref() {
            if file.contains(pos) {
                return Some(Arc::clone(file));
            }
        }
        let file = self.find(pos)?;
        *last = Some(Arc::clone(&file));
        Some(file)
    }

    /// Resolves `pos` into file name, line and column.
    ///
    /// Positions that belong to no file resolve to an empty [`SourceFilePos`].
    pub fn position(&self, pos: Pos) -> SourceFilePos {
        match self.file(pos) {
            Some(file) => file.position(pos),
            None => SourceFilePos::default(),
        }
    }

    fn find(&self, pos: Pos) -> Option<Arc<SourceFile>> {
        let i = self
            .files
            .partition_point(|f| f.base() <= pos.0)
            .checked_sub(1)?;
        let file = &self.files[i];
        file.contains(pos).then(|| Arc::clone(file))
    }
}

impl Default for SourceFileSet {
    fn default() -> Self {
        Self::new()
    }
}

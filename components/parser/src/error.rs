//! Parser diagnostics

use core_types::SourceFilePos;
use serde::Serialize;
use std::fmt;

/// A single syntax or literal error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Where the error was detected
    pub pos: SourceFilePos,
    /// What went wrong
    pub msg: String,
}

impl ParseError {
    /// Creates an error at `pos`
    pub fn new(pos: SourceFilePos, msg: impl Into<String>) -> Self {
        Self {
            pos,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse Error: {}", self.msg)?;
        if self.pos.is_valid() || !self.pos.filename.is_empty() {
            write!(f, "\n\tat {}", self.pos)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Ordered collection of [`ParseError`]s.
///
/// An error on the same line as the most recently added one is dropped, which
/// keeps one mistake from producing a cascade of follow-up reports.
///
/// # Examples
///
/// ```
/// use core_types::SourceFilePos;
/// use parser::ErrorList;
///
/// let at = |line, column| SourceFilePos {
///     filename: "main.s".to_string(),
///     offset: 0,
///     line,
///     column,
/// };
///
/// let mut errors = ErrorList::new();
/// assert!(errors.add(at(2, 1), "expected ';'"));
/// assert!(!errors.add(at(2, 9), "expected operand"));
/// assert!(errors.add(at(1, 4), "illegal character"));
/// errors.sort();
/// assert_eq!(
///     errors.to_string(),
///     "Parse Error: illegal character\n\tat main.s:1:4 (and 1 more errors)"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorList {
    errors: Vec<ParseError>,
}

impl ErrorList {
    /// Creates an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error unless the last recorded error is on the same line.
    ///
    /// Returns whether the error was kept.
    pub fn add(&mut self, pos: SourceFilePos, msg: impl Into<String>) -> bool {
        if self.repeats_last_line(&pos) {
            return false;
        }
        self.errors.push(ParseError::new(pos, msg));
        true
    }

    /// Whether `pos` is on the same line as the last recorded error
    pub fn repeats_last_line(&self, pos: &SourceFilePos) -> bool {
        self.errors
            .last()
            .map_or(false, |last| {
                last.pos.line == pos.line && last.pos.filename == pos.filename
            })
    }

    /// Number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no error was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the errors in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    /// Errors as a slice
    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }

    /// Sorts by file name, line, column and message
    pub fn sort(&mut self) {
        self.errors.sort_by(|a, b| {
            (&a.pos.filename, a.pos.line, a.pos.column, &a.msg).cmp(&(
                &b.pos.filename,
                b.pos.line,
                b.pos.column,
                &b.msg,
            ))
        });
    }

    /// `Ok(())` for an empty list, the list itself otherwise
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("no errors"),
            [only] => fmt::Display::fmt(only, f),
            [first, rest @ ..] => write!(f, "{} (and {} more errors)", first, rest.len()),
        }
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

//! Source positions and ranges
//!
//! Lines and columns are 1-based; `end` is inclusive (the last character of
//! the range). This matches what the visualization UI highlights.

use serde::{Deserialize, Serialize};

/// A 1-based (line, column) position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub begin_line: u32,
    pub begin_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceRange {
    pub const fn new(begin_line: u32, begin_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            begin_line,
            begin_col,
            end_line,
            end_col,
        }
    }

    /// Range spanning from the start of `first` to the end of `last`
    pub fn spanning(first: SourceRange, last: SourceRange) -> Self {
        Self::new(first.begin_line, first.begin_col, last.end_line, last.end_col)
    }

    #[inline]
    pub fn begin(&self) -> Position {
        Position::new(self.begin_line, self.begin_col)
    }

    #[inline]
    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_col)
    }

    /// `other` lies inside `self`; shared bounds allowed
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.begin() <= other.begin() && other.end() <= self.end()
    }

    /// `other` lies inside `self` and shares neither bound
    pub fn strictly_contains(&self, other: &SourceRange) -> bool {
        self.begin() < other.begin() && other.end() < self.end()
    }

    /// Whether the two ranges share at least one position
    pub fn overlaps(&self, other: &SourceRange) -> bool {
        self.begin() <= other.end() && other.begin() <= self.end()
    }

    /// Whether `line` falls inside this range
    pub fn covers_line(&self, line: u32) -> bool {
        self.begin_line <= line && line <= self.end_line
    }
}

impl std::fmt::Display for SourceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.begin_line, self.begin_col, self.end_line, self.end_col
        )
    }
}

//! Core types for source mapping

use serde::{Deserialize, Serialize};

/// A location in source text (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Byte offset from start of source
    pub offset: usize,
    /// Row number (0-indexed)
    pub row: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Location {
    /// The row/column part of this location, as used in source maps
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }
}

/// A range in source text from start to end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Start location (inclusive)
    pub start: Location,
    /// End location (exclusive)
    pub end: Location,
}

/// A row/column pair (both 0-indexed) in generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Where a generated position came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalPosition {
    /// Source file name as it appears in the map's `sources`
    pub source: String,
    /// Row in the source (0-indexed)
    pub row: usize,
    /// Column in the source (0-indexed)
    pub column: usize,
    /// Optional symbol name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl OriginalPosition {
    pub fn new(source: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            row,
            column,
            name: None,
        }
    }
}

/// A single mapping entry from a generated position to an optional original one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub generated: Position,
    pub original: Option<OriginalPosition>,
}

impl Mapping {
    pub fn new(generated: Position, original: Option<OriginalPosition>) -> Self {
        Self {
            generated,
            original,
        }
    }
}

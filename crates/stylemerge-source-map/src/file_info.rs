//! Efficient file information for location lookups

use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Efficient file content analysis for location lookups
///
/// This struct stores the byte offsets of every line break so that offsets
/// can be converted to (row, column) positions without rescanning the whole
/// text. Columns are counted in characters, so lookups take the content
/// alongside the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInformation {
    /// Byte offsets of each newline character in the file
    line_breaks: Vec<usize>,

    /// Total length of the file in bytes
    total_length: usize,
}

impl FileInformation {
    /// Create file information by analyzing content
    ///
    /// # Example
    ///
    /// ```
    /// use stylemerge_source_map::FileInformation;
    ///
    /// let info = FileInformation::new("a {}\nb {}");
    /// assert_eq!(info.line_count(), 2);
    /// ```
    pub fn new(content: &str) -> Self {
        let line_breaks: Vec<usize> = content
            .char_indices()
            .filter_map(|(idx, ch)| if ch == '\n' { Some(idx) } else { None })
            .collect();

        FileInformation {
            line_breaks,
            total_length: content.len(),
        }
    }

    /// Convert a byte offset to a Location with row and column
    ///
    /// Uses binary search to find the line, then counts characters from the
    /// start of that line. Returns None if the offset is out of bounds or
    /// does not fall on a character boundary.
    ///
    /// # Example
    ///
    /// ```
    /// use stylemerge_source_map::FileInformation;
    ///
    /// let content = "hello\nwörld";
    /// let info = FileInformation::new(content);
    /// let loc = info.offset_to_location(9, content).unwrap();
    /// assert_eq!(loc.row, 1);
    /// assert_eq!(loc.column, 2);
    /// ```
    pub fn offset_to_location(&self, offset: usize, content: &str) -> Option<Location> {
        if offset > self.total_length {
            return None;
        }

        // A newline belongs to the line it terminates
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };

        let line_start = self.line_start(row)?;
        let column = content.get(line_start..offset)?.chars().count();

        Some(Location {
            offset,
            row,
            column,
        })
    }

    /// Convert a (row, column) pair back into a byte offset
    ///
    /// Returns None if the row does not exist or the column runs past the
    /// end of its line.
    pub fn location_to_offset(&self, row: usize, column: usize, content: &str) -> Option<usize> {
        let line_start = self.line_start(row)?;
        let line_end = self
            .line_breaks
            .get(row)
            .copied()
            .unwrap_or(self.total_length);
        let line = content.get(line_start..line_end)?;

        if column == 0 {
            return Some(line_start);
        }
        let mut chars = line.char_indices();
        match chars.nth(column) {
            Some((idx, _)) => Some(line_start + idx),
            None if line.chars().count() == column => Some(line_end),
            None => None,
        }
    }

    /// Get the total length of the file in bytes
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Get the number of lines in the file
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }

    fn line_start(&self, row: usize) -> Option<usize> {
        if row == 0 {
            Some(0)
        } else {
            self.line_breaks.get(row - 1).map(|idx| idx + 1)
        }
    }
}

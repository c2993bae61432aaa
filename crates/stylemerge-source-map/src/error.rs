//! Errors raised while reading source maps

use thiserror::Error;

/// Errors that can occur when a source map is parsed or decoded
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// The map is not valid JSON or does not have the expected shape
    #[error("Invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Only revision 3 maps are understood
    #[error("Unsupported source map version {0} (expected 3)")]
    UnsupportedVersion(u32),

    /// The `mappings` string contains a character outside the base64 alphabet
    #[error("Invalid base64 VLQ character '{0}' in mappings")]
    InvalidBase64(char),

    /// A VLQ value ended in the middle of a continuation
    #[error("Truncated VLQ value in mappings")]
    TruncatedVlq,

    /// A VLQ value does not fit in 64 bits
    #[error("VLQ value in mappings is too large")]
    VlqOverflow,

    /// A segment did not have 1, 4 or 5 fields
    #[error("Mapping segment on line {line} has {fields} fields (expected 1, 4 or 5)")]
    BadSegment { line: usize, fields: usize },

    /// A segment referenced a source or name that does not exist
    #[error("Mapping on line {line} references {kind} index {index} out of range")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: i64,
    },

    /// Relative decoding or a VLQ value left the representable range
    #[error("Mapping on line {line} overflows the {field}")]
    Overflow { line: usize, field: &'static str },

    /// Relative decoding produced a negative position
    #[error("Mapping on line {line} decodes to a negative {field}")]
    NegativeValue { line: usize, field: &'static str },
}

//! Error code catalog and lookup.
//!
//! Maps stable codes (like "SM-1-1") to their subsystem, title and default
//! message. Codes never change once published, even if wording improves.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "transform", "merge", "config")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    /// URL to documentation (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// When this code was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time from `error_catalog.json`.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid, which the tests below catch.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON")
});

/// Look up error code information.
///
/// # Example
///
/// ```
/// use stylemerge_error_reporting::catalog::get_error_info;
///
/// let info = get_error_info("SM-1-1").unwrap();
/// assert_eq!(info.title, "CSS Syntax Error");
/// ```
pub fn get_error_info(code: &str) -> Option<&'static ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Get the subsystem name for an error code.
pub fn get_subsystem(code: &str) -> Option<&'static str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_codes_follow_format() {
        for code in ERROR_CATALOG.keys() {
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "bad code {code}");
            assert_eq!(parts[0], "SM");
            assert!(parts[1].parse::<u32>().is_ok());
            assert!(parts[2].parse::<u32>().is_ok());
        }
    }

    #[test]
    fn test_get_subsystem() {
        assert_eq!(get_subsystem("SM-3-1"), Some("merge"));
        assert_eq!(get_subsystem("SM-999-999"), None);
    }
}

//! Serialized Source Map Revision 3 model

use serde::{Deserialize, Serialize};

use crate::error::SourceMapError;

/// A source map as it appears on disk or next to a compiled stylesheet
///
/// Field names follow the revision 3 format, so this type serializes
/// directly to the JSON browsers and tools expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// An empty revision 3 map
    pub fn empty(file: Option<String>) -> Self {
        Self {
            version: 3,
            file,
            source_root: None,
            sources: Vec::new(),
            sources_content: None,
            names: Vec::new(),
            mappings: String::new(),
        }
    }

    /// Parse a map from its JSON text
    ///
    /// Only the envelope is checked here; segment-level validation happens
    /// when a [`crate::SourceMapConsumer`] is built.
    pub fn from_json(json: &str) -> Result<Self, SourceMapError> {
        let map: SourceMap = serde_json::from_str(json)?;
        if map.version != 3 {
            return Err(SourceMapError::UnsupportedVersion(map.version));
        }
        Ok(map)
    }

    /// Serialize to compact JSON
    pub fn to_json_string(&self) -> String {
        // Every field is a string, integer or list of those
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Embedded content for `source`, if the map carries it
    pub fn source_content(&self, source: &str) -> Option<&str> {
        let index = self.sources.iter().position(|s| s == source)?;
        self.sources_content
            .as_ref()?
            .get(index)?
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_reads_camel_case_fields() {
        let json = r#"{
            "version": 3,
            "file": "out.css",
            "sources": ["a.less"],
            "sourcesContent": ["@x: 1;"],
            "names": [],
            "mappings": "AAAA"
        }"#;
        let map = SourceMap::from_json(json).unwrap();
        assert_eq!(map.file.as_deref(), Some("out.css"));
        assert_eq!(map.source_content("a.less"), Some("@x: 1;"));
        assert_eq!(map.source_content("missing.less"), None);
    }

    #[test]
    fn test_from_json_rejects_other_versions() {
        let err = SourceMap::from_json(r#"{"version": 2, "mappings": ""}"#).unwrap_err();
        assert!(matches!(err, SourceMapError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SourceMap::from_json("not a map"),
            Err(SourceMapError::Json(_))
        ));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let json = SourceMap::empty(None).to_json_string();
        assert_eq!(json, r#"{"version":3,"sources":[],"names":[],"mappings":""}"#);
    }
}

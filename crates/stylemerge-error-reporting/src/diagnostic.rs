//! Core diagnostic message types.
//!
//! This module defines the fundamental structures for representing diagnostic
//! messages (errors, warnings, info) following tidyverse-style guidelines.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error attributed to one input file
    Error,
    /// A problem that does not stop the bundle from being produced
    Warning,
    /// Informational message
    Info,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (i bullet)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
}

/// A position in a named source file, 1-based as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A diagnostic message following tidyverse-style structure.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "SM-1-1") for searchability
/// 2. **Title**: Brief message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailItem>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Where the issue occurred, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code (`SM-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a source location.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Render this diagnostic message as text.
    ///
    /// When the message has a location and the caller supplies the text of
    /// that file, the output starts with an ariadne excerpt of the offending
    /// line. Otherwise it falls back to the plain tidyverse layout:
    ///
    /// ```text
    /// Error [SM-1-1]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    ///
    /// # Example
    ///
    /// ```
    /// use stylemerge_error_reporting::DiagnosticMessageBuilder;
    ///
    /// let msg = DiagnosticMessageBuilder::error("Unknown plugin")
    ///     .problem("`minify` is not a built-in plugin")
    ///     .add_hint("Check the spelling in your config file?")
    ///     .build();
    /// let text = msg.to_text(None);
    /// assert!(text.contains("Error: Unknown plugin"));
    /// assert!(text.contains("? Check the spelling"));
    /// ```
    pub fn to_text(&self, source: Option<&str>) -> String {
        let mut result = String::new();

        let excerpt = match (&self.location, source) {
            (Some(location), Some(text)) => {
                let label = self.problem.as_deref().unwrap_or(&self.title);
                crate::excerpt::render_excerpt(
                    self.kind,
                    &self.headline(),
                    location,
                    text,
                    label,
                )
            }
            _ => None,
        };

        match excerpt {
            Some(rendered) => {
                // The excerpt already shows title, code and problem
                result.push_str(&rendered);
            }
            None => {
                result.push_str(&format!("{}: {}\n", self.kind.label(), self.headline()));
                if let Some(location) = &self.location {
                    result.push_str(&format!("  --> {}\n", location));
                }
                if let Some(problem) = &self.problem {
                    result.push_str(problem);
                    result.push('\n');
                }
            }
        }

        for detail in &self.details {
            result.push_str(&format!("{} {}\n", detail.kind.bullet(), detail.content));
        }
        for hint in &self.hints {
            result.push_str(&format!("? {}\n", hint));
        }
        if let Some(url) = self.catalog_entry().and_then(|info| info.docs_url.as_deref()) {
            result.push_str(&format!("See {}\n", url));
        }

        result
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// Messages with a catalogued code also carry the code's subsystem.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let (Some(info), Some(object)) = (self.catalog_entry(), value.as_object_mut()) {
            object.insert("subsystem".to_string(), info.subsystem.clone().into());
        }
        value
    }

    fn catalog_entry(&self) -> Option<&'static crate::catalog::ErrorCodeInfo> {
        self.code.as_deref().and_then(crate::catalog::get_error_info)
    }

    fn headline(&self) -> String {
        match &self.code {
            Some(code) => format!("[{}] {}", code, self.title),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_message_new() {
        let msg = DiagnosticMessage::new(DiagnosticKind::Error, "Test error");
        assert_eq!(msg.title, "Test error");
        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert!(msg.code.is_none());
        assert!(msg.problem.is_none());
        assert!(msg.details.is_empty());
        assert!(msg.hints.is_empty());
    }

    #[test]
    fn test_to_text_without_source_shows_location_line() {
        let msg = DiagnosticMessage::error("Unclosed block")
            .with_code("SM-1-1")
            .at(SourceLocation {
                file: "client/main.css".to_string(),
                line: 3,
                column: 7,
            });
        let text = msg.to_text(None);
        assert!(text.starts_with("Error: [SM-1-1] Unclosed block\n"));
        assert!(text.contains("--> client/main.css:3:7"));
    }

    #[test]
    fn test_to_json_uses_lowercase_kind() {
        let msg = DiagnosticMessage::warning("Something odd");
        let json = msg.to_json();
        assert_eq!(json["kind"], "warning");
        assert_eq!(json["title"], "Something odd");
        assert!(json.get("details").is_none());
        assert!(json.get("subsystem").is_none());
    }

    #[test]
    fn test_to_json_adds_catalogued_subsystem() {
        let msg = DiagnosticMessage::warning("Misplaced @import").with_code("SM-3-1");
        assert_eq!(msg.to_json()["subsystem"], "merge");

        let unknown = DiagnosticMessage::warning("Odd").with_code("SM-9-9");
        assert!(unknown.to_json().get("subsystem").is_none());
    }
}

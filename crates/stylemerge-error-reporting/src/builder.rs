//! Builder API for diagnostic messages.
//!
//! The builder encodes the tidyverse structure: a short title, one problem
//! statement, a handful of details and optional hints.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, SourceLocation};

/// Builder for [`DiagnosticMessage`].
///
/// # Example
///
/// ```
/// use stylemerge_error_reporting::{DiagnosticKind, DiagnosticMessageBuilder};
///
/// let msg = DiagnosticMessageBuilder::error("Plugin failed")
///     .with_code("SM-1-2")
///     .problem("`nesting` could not process the stylesheet")
///     .add_detail("Selector list was empty")
///     .build();
/// assert_eq!(msg.kind, DiagnosticKind::Error);
/// assert_eq!(msg.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
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

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Add an error-bulleted detail.
    pub fn add_detail(mut self, detail: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
        });
        self
    }

    pub fn add_info(mut self, info: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
        });
        self
    }

    pub fn add_note(mut self, note: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Note,
            content: note.into(),
        });
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn at_location(mut self, file: impl Into<String>, line: usize, column: usize) -> Self {
        self.message.location = Some(SourceLocation {
            file: file.into(),
            line,
            column,
        });
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_all_parts() {
        let msg = DiagnosticMessageBuilder::warning("Misplaced @import")
            .with_code("SM-3-1")
            .problem("@import rules must come first")
            .add_info("The rule was moved to the top of the bundle")
            .add_note("Imports are hoisted in file order")
            .add_hint("Move the rule to the top of the file?")
            .at_location("a.css", 4, 1)
            .build();

        assert_eq!(msg.kind, DiagnosticKind::Warning);
        assert_eq!(msg.code.as_deref(), Some("SM-3-1"));
        assert_eq!(msg.details.len(), 2);
        assert_eq!(msg.details[0].kind, DetailKind::Info);
        assert_eq!(msg.details[1].kind, DetailKind::Note);
        assert_eq!(msg.hints.len(), 1);
        assert_eq!(msg.location.as_ref().map(|l| l.line), Some(4));
    }

    #[test]
    fn test_rendered_bullets() {
        let text = DiagnosticMessageBuilder::error("Bad input")
            .add_detail("first")
            .add_info("second")
            .build()
            .to_text(None);
        assert!(text.contains("✖ first"));
        assert!(text.contains("ℹ second"));
    }
}

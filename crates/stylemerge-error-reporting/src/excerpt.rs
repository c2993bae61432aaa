//! Source excerpts rendered with ariadne.

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::diagnostic::{DiagnosticKind, SourceLocation};

/// Convert a 1-based line/column into a character offset.
///
/// Columns past the end of the line are clamped to the line end.
fn char_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    let mut offset = 0;
    for (index, text) in source.split('\n').enumerate() {
        let length = text.chars().count();
        if index + 1 == line {
            return Some(offset + column.saturating_sub(1).min(length));
        }
        offset += length + 1;
    }
    None
}

/// Render an excerpt of `source` around `location`.
///
/// The output is uncolored so it can be embedded in error messages that are
/// stored, compared or forwarded to another tool. Returns None when the
/// location does not exist in `source`.
///
/// # Example
///
/// ```
/// use stylemerge_error_reporting::{DiagnosticKind, SourceLocation, render_excerpt};
///
/// let location = SourceLocation { file: "a.css".into(), line: 2, column: 3 };
/// let text = render_excerpt(
///     DiagnosticKind::Error,
///     "Unknown word",
///     &location,
///     ".a {\n  colr red;\n}",
///     "Unknown word",
/// )
/// .unwrap();
/// assert!(text.contains("colr red;"));
/// ```
pub fn render_excerpt(
    kind: DiagnosticKind,
    headline: &str,
    location: &SourceLocation,
    source: &str,
    label: &str,
) -> Option<String> {
    let start = char_offset(source, location.line, location.column)?;
    let total = source.chars().count();
    let (start, end) = if start < total {
        (start, start + 1)
    } else {
        (total.saturating_sub(1), total)
    };

    let report_kind = match kind {
        DiagnosticKind::Error => ReportKind::Error,
        DiagnosticKind::Warning => ReportKind::Warning,
        DiagnosticKind::Info => ReportKind::Advice,
    };

    let file = location.file.clone();
    let report = Report::build(report_kind, file.clone(), start)
        .with_config(Config::default().with_color(false))
        .with_message(headline)
        .with_label(Label::new((file.clone(), start..end)).with_message(label))
        .finish();

    let mut output = Vec::new();
    report
        .write((file, Source::from(source)), &mut output)
        .ok()?;

    String::from_utf8(output).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offset() {
        let source = "ab\ncdé\nf";
        assert_eq!(char_offset(source, 1, 1), Some(0));
        assert_eq!(char_offset(source, 2, 3), Some(5));
        assert_eq!(char_offset(source, 3, 1), Some(7));
        // Clamped to the end of the line
        assert_eq!(char_offset(source, 1, 99), Some(2));
        assert_eq!(char_offset(source, 4, 1), None);
    }

    #[test]
    fn test_excerpt_names_file_and_line() {
        let location = SourceLocation {
            file: "client/main.css".to_string(),
            line: 2,
            column: 3,
        };
        let text = render_excerpt(
            DiagnosticKind::Error,
            "[SM-1-1] CSS syntax error",
            &location,
            ".a {\n  colr red;\n}\n",
            "Unknown word",
        )
        .unwrap();

        assert!(text.contains("[SM-1-1] CSS syntax error"));
        assert!(text.contains("client/main.css"));
        assert!(text.contains("colr red;"));
        assert!(text.contains("Unknown word"));
    }

    #[test]
    fn test_excerpt_at_end_of_file() {
        let location = SourceLocation {
            file: "a.css".to_string(),
            line: 1,
            column: 5,
        };
        let text =
            render_excerpt(DiagnosticKind::Error, "Unclosed block", &location, ".a {", "here")
                .unwrap();
        assert!(text.contains("Unclosed block"));
    }

    #[test]
    fn test_excerpt_for_missing_line_is_none() {
        let location = SourceLocation {
            file: "a.css".to_string(),
            line: 10,
            column: 1,
        };
        assert!(render_excerpt(DiagnosticKind::Error, "x", &location, ".a{}", "here").is_none());
    }
}

/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet merging with @import hoisting.
 */

//! Stylesheet merging with `@import` hoisting.
//!
//! CSS only honors `@import` before every other rule, so merging many
//! sheets into one must move imports up. The merge is a stable partition
//! of the concatenated top-level nodes: every import in input order, then
//! everything else in input order. Nothing is deduplicated. Nodes keep
//! their origin, so the merged sheet still maps back to each file.

use stylemerge_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};

use crate::ast::{Node, RuleKind, Stylesheet};
use crate::error::ANONYMOUS_INPUT;

/// A non-fatal anomaly found while merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// An `@import` after a non-import rule of the same file
    MisplacedImport,
    /// An `@charset` other than UTF-8, dropped because the bundle is UTF-8
    IgnoredCharset { charset: String },
}

impl std::fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeWarning::MisplacedImport => write!(
                f,
                "There are some @import rules in the middle of a file. \
                 They are moved to the top of the bundle, which may change their meaning."
            ),
            MergeWarning::IgnoredCharset { charset } => {
                write!(f, "@charset \"{charset}\" is ignored, the bundle is always UTF-8.")
            }
        }
    }
}

impl MergeWarning {
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let (code, title) = match self {
            MergeWarning::MisplacedImport => ("SM-3-1", "Misplaced @import"),
            MergeWarning::IgnoredCharset { .. } => ("SM-3-2", "Ignored @charset"),
        };
        DiagnosticMessageBuilder::warning(title)
            .with_code(code)
            .problem(self.to_string())
            .build()
    }
}

/// Merge stylesheets, in order, into one.
///
/// `warn` receives the name of the offending file and the anomaly.
///
/// # Example
///
/// ```
/// use stylemerge_core::merge::merge_stylesheets;
/// use stylemerge_core::parser::{ParseOptions, parse};
///
/// let a = parse("@import 'x'; .a{}", &ParseOptions::new("a.css")).unwrap();
/// let b = parse(".b{} @import 'y';", &ParseOptions::new("b.css")).unwrap();
///
/// let mut warnings = Vec::new();
/// let merged = merge_stylesheets(vec![a, b], &mut |file, w| warnings.push((file.to_string(), w.clone())));
/// assert_eq!(merged.nodes.len(), 4);
/// assert!(merged.nodes[0].is_import() && merged.nodes[1].is_import());
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].0, "b.css");
/// ```
pub fn merge_stylesheets(
    asts: Vec<Stylesheet>,
    warn: &mut dyn FnMut(&str, &MergeWarning),
) -> Stylesheet {
    let mut imports = Vec::new();
    let mut rest = Vec::new();

    for sheet in asts {
        let file = sheet
            .source
            .as_deref()
            .unwrap_or(ANONYMOUS_INPUT)
            .to_string();
        let mut seen_rule = false;
        let mut warned_misplaced = false;

        for node in sheet.nodes {
            match node.kind() {
                RuleKind::Import => {
                    if seen_rule && !warned_misplaced {
                        warn(&file, &MergeWarning::MisplacedImport);
                        warned_misplaced = true;
                    }
                    imports.push(node);
                }
                RuleKind::Regular | RuleKind::Other => {
                    if let Some(charset) = charset_of(&node) {
                        if !charset.eq_ignore_ascii_case("utf-8") {
                            warn(&file, &MergeWarning::IgnoredCharset { charset });
                        }
                        continue;
                    }
                    if !matches!(node, Node::Comment(_)) {
                        seen_rule = true;
                    }
                    rest.push(node);
                }
            }
        }
    }

    tracing::debug!(
        imports = imports.len(),
        rules = rest.len(),
        "Merged stylesheets"
    );

    imports.extend(rest);
    Stylesheet::new(imports, None)
}

/// The declared encoding of an `@charset` rule
fn charset_of(node: &Node) -> Option<String> {
    match node {
        Node::AtRule(at) if at.name.eq_ignore_ascii_case("charset") => Some(
            at.params
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string(),
        ),
        _ => None,
    }
}

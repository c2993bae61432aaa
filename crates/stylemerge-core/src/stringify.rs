/*
 * stringify.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet serialization with source maps.
 */

//! Stylesheet serialization with source maps.
//!
//! Turns a [`Stylesheet`] back into text. When a map is requested, every
//! node that knows its span and origin gets a mapping from its first
//! generated character to the start of its span, and block nodes also map
//! their closing brace. Because each node carries its own origin, a merged
//! sheet built from many files produces one map with many sources.

use stylemerge_source_map::{Mapping, OriginalPosition, Position, SourceMapGenerator};

use crate::ast::{Node, NodeMeta, Stylesheet};

/// Layout of the generated text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// Two-space indentation, one declaration per line, a blank line
    /// between top-level blocks
    #[default]
    Expanded,
    /// One top-level statement per line, no optional whitespace
    Compact,
}

#[derive(Debug, Clone, Default)]
pub struct StringifyOptions {
    /// Build a source map alongside the text
    pub source_map: bool,
    pub style: OutputStyle,
    /// Value of the map's `file` field
    pub file: Option<String>,
}

impl StringifyOptions {
    pub fn with_map(file: impl Into<String>) -> Self {
        Self {
            source_map: true,
            style: OutputStyle::Expanded,
            file: Some(file.into()),
        }
    }
}

/// Output of [`stringify`]
#[derive(Debug, Clone)]
pub struct Stringified {
    pub code: String,
    pub map: Option<SourceMapGenerator>,
}

/// Serialize a stylesheet.
///
/// # Example
///
/// ```
/// use stylemerge_core::parser::{ParseOptions, parse};
/// use stylemerge_core::stringify::{StringifyOptions, stringify};
///
/// let sheet = parse(".a{color:red}", &ParseOptions::new("a.css")).unwrap();
/// let out = stringify(&sheet, &StringifyOptions::with_map("out.css"));
/// assert_eq!(out.code, ".a {\n  color: red;\n}");
/// assert_eq!(out.map.unwrap().sources(), vec!["a.css".to_string()]);
/// ```
pub fn stringify(sheet: &Stylesheet, options: &StringifyOptions) -> Stringified {
    let mut writer = Writer {
        code: String::new(),
        row: 0,
        column: 0,
        style: options.style,
        map: options
            .source_map
            .then(|| SourceMapGenerator::new(options.file.clone())),
    };

    let mut previous: Option<&Node> = None;
    for node in &sheet.nodes {
        if let Some(prev) = previous {
            writer.push("\n");
            if options.style == OutputStyle::Expanded && (is_block(prev) || is_block(node)) {
                writer.push("\n");
            }
        }
        writer.node(node, 0);
        previous = Some(node);
    }

    Stringified {
        code: writer.code,
        map: writer.map,
    }
}

/// A map from `sheet`'s own text to itself, one mapping per node start and
/// block end.
///
/// Used when a stylesheet is passed through without being re-serialized.
pub fn identity_map(sheet: &Stylesheet, file: Option<String>) -> SourceMapGenerator {
    let mut map = SourceMapGenerator::new(file);
    sheet.walk(&mut |node| {
        let meta = node.meta();
        let (Some(span), Some(origin)) = (&meta.span, &meta.origin) else {
            return;
        };
        map.add(
            span.start.position(),
            OriginalPosition::new(origin.as_ref(), span.start.row, span.start.column),
        );
        if is_block(node) && span.end.column > 0 {
            let close = Position::new(span.end.row, span.end.column - 1);
            map.add(close, OriginalPosition::new(origin.as_ref(), close.row, close.column));
        }
    });
    map
}

fn is_block(node: &Node) -> bool {
    node.children().is_some()
}

struct Writer {
    code: String,
    row: usize,
    column: usize,
    style: OutputStyle,
    map: Option<SourceMapGenerator>,
}

impl Writer {
    fn push(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.row += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.code.push_str(text);
    }

    fn indent(&mut self, depth: usize) {
        if self.style == OutputStyle::Expanded {
            for _ in 0..depth {
                self.push("  ");
            }
        }
    }

    fn mark_start(&mut self, meta: &NodeMeta) {
        let (Some(map), Some(span), Some(origin)) = (&mut self.map, &meta.span, &meta.origin) else {
            return;
        };
        map.add_mapping(Mapping::new(
            Position::new(self.row, self.column),
            Some(OriginalPosition::new(
                origin.as_ref(),
                span.start.row,
                span.start.column,
            )),
        ));
    }

    /// Map a closing brace to the last character of the node's span
    fn mark_end(&mut self, meta: &NodeMeta) {
        let (Some(map), Some(span), Some(origin)) = (&mut self.map, &meta.span, &meta.origin) else {
            return;
        };
        if span.end.column == 0 {
            return;
        }
        map.add_mapping(Mapping::new(
            Position::new(self.row, self.column),
            Some(OriginalPosition::new(
                origin.as_ref(),
                span.end.row,
                span.end.column - 1,
            )),
        ));
    }

    fn node(&mut self, node: &Node, depth: usize) {
        self.indent(depth);
        self.mark_start(node.meta());
        match node {
            Node::Rule(rule) => {
                self.push(&rule.selector);
                self.block(&rule.nodes, node.meta(), depth);
            }
            Node::AtRule(at) => {
                self.push("@");
                self.push(&at.name);
                if !at.params.is_empty() {
                    self.push(" ");
                    self.push(&at.params);
                }
                match &at.nodes {
                    Some(children) => self.block(children, node.meta(), depth),
                    None => self.push(";"),
                }
            }
            Node::Declaration(decl) => {
                self.push(&decl.prop);
                self.push(match self.style {
                    OutputStyle::Expanded => ": ",
                    OutputStyle::Compact => ":",
                });
                self.push(&decl.value);
                if decl.important {
                    self.push(" !important");
                }
                if self.style == OutputStyle::Expanded {
                    self.push(";");
                }
            }
            Node::Comment(comment) => {
                self.push("/*");
                self.push(&comment.text);
                self.push("*/");
            }
        }
    }

    fn block(&mut self, children: &[Node], meta: &NodeMeta, depth: usize) {
        match self.style {
            OutputStyle::Expanded => {
                if children.is_empty() {
                    self.push(" {");
                } else {
                    self.push(" {");
                    for child in children {
                        self.push("\n");
                        self.node(child, depth + 1);
                    }
                    self.push("\n");
                    self.indent(depth);
                }
            }
            OutputStyle::Compact => {
                self.push("{");
                for (index, child) in children.iter().enumerate() {
                    if index > 0 && matches!(children[index - 1], Node::Declaration(_)) {
                        self.push(";");
                    }
                    self.node(child, depth + 1);
                }
            }
        }
        self.mark_end(meta);
        self.push("}");
    }
}

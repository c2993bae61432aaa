/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet parser.
 */

//! Stylesheet parser.
//!
//! A small, position-tracking CSS parser that produces the tree in
//! [`crate::ast`]. It knows enough about CSS to find statement and block
//! boundaries (strings, escapes, comments, brackets) and leaves selectors,
//! at-rule preludes and values as raw text.
//!
//! Two modes are supported. [`ParseMode::Strict`] reports the first syntax
//! error. [`ParseMode::Safe`] never fails: it closes blocks left open at the
//! end of input, drops stray closing braces and unparseable statements, and
//! lets unterminated strings and comments run to the end of input.

use serde::{Deserialize, Serialize};
use stylemerge_source_map::{FileInformation, Range};

use crate::ast::{AtRule, Comment, Declaration, Node, NodeMeta, Origin, Rule, Stylesheet};
use crate::error::CssSyntaxError;

/// Which parser to use on stylesheet text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Strict,
    Safe,
}

impl ParseMode {
    /// Resolve a parser name as written in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" | "strict" | "postcss" => Some(ParseMode::Strict),
            "safe" | "postcss-safe-parser" => Some(ParseMode::Safe),
            _ => None,
        }
    }
}

/// Options for [`parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Name used for provenance tags and error messages
    pub source_name: Option<String>,
    /// Record node spans
    pub track_positions: bool,
    pub mode: ParseMode,
}

impl ParseOptions {
    /// Strict parsing of a named source, with positions
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: Some(source_name.into()),
            track_positions: true,
            mode: ParseMode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Parse stylesheet text.
///
/// Every node is tagged with `source_name` as its origin. With
/// `track_positions`, spans are byte offsets plus 0-based row and character
/// column into `text`.
///
/// # Example
///
/// ```
/// use stylemerge_core::parser::{ParseOptions, parse};
///
/// let sheet = parse("@import 'x';\n.a { color: red }", &ParseOptions::new("a.css")).unwrap();
/// assert_eq!(sheet.nodes.len(), 2);
/// assert!(sheet.nodes[0].is_import());
/// ```
pub fn parse(text: &str, options: &ParseOptions) -> Result<Stylesheet, CssSyntaxError> {
    let origin: Option<Origin> = options.source_name.as_deref().map(Origin::from);
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        options,
        info: FileInformation::new(text),
        origin: origin.clone(),
    };
    let nodes = parser.parse_block(None)?;
    Ok(Stylesheet::new(nodes, origin))
}

/// How a statement prelude ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Eof,
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    options: &'a ParseOptions,
    info: FileInformation,
    origin: Option<Origin>,
}

impl Parser<'_> {
    fn safe(&self) -> bool {
        self.options.mode == ParseMode::Safe
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_comment_start(&self, index: usize) -> bool {
        self.bytes.get(index) == Some(&b'/') && self.bytes.get(index + 1) == Some(&b'*')
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')) {
            self.pos += 1;
        }
    }

    /// Parse nodes until the end of input or, when `open` is the offset of
    /// an opening brace, until the matching closing brace.
    fn parse_block(&mut self, open: Option<usize>) -> Result<Vec<Node>, CssSyntaxError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(byte) = self.peek() else {
                return match open {
                    Some(at) if !self.safe() => Err(self.error_at(at, "Unclosed block")),
                    _ => Ok(nodes),
                };
            };

            match byte {
                b'}' => {
                    if open.is_some() {
                        self.pos += 1;
                        return Ok(nodes);
                    }
                    if !self.safe() {
                        return Err(self.error_at(self.pos, "Unexpected }"));
                    }
                    self.pos += 1;
                }
                b';' => self.pos += 1,
                b'/' if self.at_comment_start(self.pos) => nodes.push(self.comment()?),
                b'@' => {
                    if let Some(node) = self.at_rule()? {
                        nodes.push(node);
                    }
                }
                _ => {
                    if let Some(node) = self.rule_or_declaration(open.is_some())? {
                        nodes.push(node);
                    }
                }
            }
        }
    }

    fn comment(&mut self) -> Result<Node, CssSyntaxError> {
        let start = self.pos;
        let body_start = start + 2;
        let (body_end, end) = match self.text[body_start..].find("*/") {
            Some(index) => (body_start + index, body_start + index + 2),
            None if self.safe() => (self.text.len(), self.text.len()),
            None => return Err(self.error_at(start, "Unclosed comment")),
        };
        self.pos = end;

        Ok(Node::Comment(Comment {
            text: self.text[body_start..body_end].to_string(),
            meta: self.meta(start, end),
        }))
    }

    fn at_rule(&mut self) -> Result<Option<Node>, CssSyntaxError> {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        let name = self.text[name_start..self.pos].to_string();

        let (end, terminator) = self.scan_prelude()?;
        let params = self.text[self.pos..end].trim().to_string();

        if name.is_empty() {
            if !self.safe() {
                return Err(self.error_at(start, "At-rule without name"));
            }
            self.skip_statement(end, terminator)?;
            return Ok(None);
        }

        let nodes = match terminator {
            Terminator::OpenBrace => {
                self.pos = end + 1;
                Some(self.parse_block(Some(end))?)
            }
            Terminator::Semicolon => {
                self.pos = end + 1;
                None
            }
            Terminator::CloseBrace | Terminator::Eof => {
                self.pos = end;
                None
            }
        };

        Ok(Some(Node::AtRule(AtRule {
            name,
            params,
            nodes,
            meta: self.meta(start, self.pos),
        })))
    }

    fn rule_or_declaration(&mut self, nested: bool) -> Result<Option<Node>, CssSyntaxError> {
        let start = self.pos;
        let (end, terminator) = self.scan_prelude()?;

        if terminator == Terminator::OpenBrace {
            let selector = self.text[start..end].trim().to_string();
            self.pos = end + 1;
            let nodes = self.parse_block(Some(end))?;
            return Ok(Some(Node::Rule(Rule {
                selector,
                nodes,
                meta: self.meta(start, self.pos),
            })));
        }

        let raw = &self.text[start..end];
        self.pos = if terminator == Terminator::Semicolon {
            end + 1
        } else {
            end
        };

        match split_declaration(raw) {
            Some((prop, value, important)) if nested => Ok(Some(Node::Declaration(Declaration {
                prop,
                value,
                important,
                meta: self.meta(start, self.pos),
            }))),
            _ if self.safe() => Ok(None),
            _ => Err(self.error_at(start, "Unknown word")),
        }
    }

    /// Skip a statement that the safe parser does not keep, including its
    /// block if it has one
    fn skip_statement(&mut self, end: usize, terminator: Terminator) -> Result<(), CssSyntaxError> {
        match terminator {
            Terminator::OpenBrace => {
                self.pos = end + 1;
                self.parse_block(Some(end))?;
            }
            Terminator::Semicolon => self.pos = end + 1,
            Terminator::CloseBrace | Terminator::Eof => self.pos = end,
        }
        Ok(())
    }

    /// Find where the statement starting at the current position ends.
    ///
    /// Does not move the cursor. Brackets, strings, escapes and comments
    /// are skipped, so `;` inside `url(...)` or a string does not count.
    fn scan_prelude(&self) -> Result<(usize, Terminator), CssSyntaxError> {
        let len = self.bytes.len();
        let mut index = self.pos;
        let mut depth = 0usize;
        let mut outermost_open = None;

        while index < len {
            match self.bytes[index] {
                b'\\' => {
                    index += 2;
                    continue;
                }
                b'"' | b'\'' => {
                    index = self.skip_string(index)?;
                    continue;
                }
                b'/' if self.at_comment_start(index) => {
                    match self.text[index + 2..].find("*/") {
                        Some(offset) => index += offset + 4,
                        None if self.safe() => index = len,
                        None => return Err(self.error_at(index, "Unclosed comment")),
                    }
                    continue;
                }
                b'(' | b'[' => {
                    if depth == 0 {
                        outermost_open = Some(index);
                    }
                    depth += 1;
                }
                b')' | b']' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => return Ok((index, Terminator::Semicolon)),
                b'{' if depth == 0 => return Ok((index, Terminator::OpenBrace)),
                b'}' if depth == 0 => return Ok((index, Terminator::CloseBrace)),
                _ => {}
            }
            index += 1;
        }

        if depth > 0 && !self.safe() {
            if let Some(open) = outermost_open {
                return Err(self.error_at(open, "Unclosed bracket"));
            }
        }
        Ok((len, Terminator::Eof))
    }

    /// Returns the offset just past the closing quote
    fn skip_string(&self, start: usize) -> Result<usize, CssSyntaxError> {
        let quote = self.bytes[start];
        let mut index = start + 1;
        while index < self.bytes.len() {
            match self.bytes[index] {
                b'\\' => index += 2,
                byte if byte == quote => return Ok(index + 1),
                _ => index += 1,
            }
        }
        if self.safe() {
            Ok(self.bytes.len())
        } else {
            Err(self.error_at(start, "Unclosed string"))
        }
    }

    fn meta(&self, start: usize, end: usize) -> NodeMeta {
        let span = if self.options.track_positions {
            match (
                self.info.offset_to_location(start, self.text),
                self.info.offset_to_location(end, self.text),
            ) {
                (Some(start), Some(end)) => Some(Range { start, end }),
                _ => None,
            }
        } else {
            None
        };
        NodeMeta {
            span,
            origin: self.origin.clone(),
        }
    }

    fn error_at(&self, offset: usize, reason: &str) -> CssSyntaxError {
        let (line, column) = self
            .info
            .offset_to_location(offset, self.text)
            .map(|location| (location.row + 1, location.column + 1))
            .unwrap_or((1, 1));
        CssSyntaxError {
            reason: reason.to_string(),
            file: self.options.source_name.clone(),
            line,
            column,
            input: Some(self.text.to_string()),
        }
    }
}

/// Split `prop: value !important` into its parts.
///
/// Returns None when there is no colon or the property is not a single word.
fn split_declaration(raw: &str) -> Option<(String, String, bool)> {
    let colon = raw.find(':')?;
    let prop = raw[..colon].trim();
    if prop.is_empty() || prop.contains(char::is_whitespace) {
        return None;
    }

    let mut value = raw[colon + 1..].trim();
    let mut important = false;
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            value = value[..bang].trim_end();
            important = true;
        }
    }

    Some((prop.to_string(), value.to_string(), important))
}

/*
 * file.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Input file handles and output stylesheets.
 */

//! Input file handles and output stylesheets.
//!
//! The host build tool owns its files. The bundler sees them through
//! [`InputFile`], reads their contents, reports per-file errors back and
//! attaches the stylesheets it produces.

use stylemerge_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use stylemerge_source_map::SourceMap;

/// An error attributed to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub message: String,
    /// 1-based position in the file's original text
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl FileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Present this error as a diagnostic for the file at `path`
    pub fn to_diagnostic(&self, path: &str) -> DiagnosticMessage {
        let builder = DiagnosticMessageBuilder::error("Stylesheet Error").problem(self.message.clone());
        match (self.line, self.column) {
            (Some(line), Some(column)) => builder.at_location(path, line, column).build(),
            _ => builder.build(),
        }
    }
}

/// A stylesheet produced by the bundler
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStylesheet {
    pub data: String,
    pub source_map: Option<SourceMap>,
    /// Name of the artifact, when it has one
    pub path: Option<String>,
}

/// A stylesheet handed to the bundler by the host
pub trait InputFile {
    /// Unique key of the file within the bundle
    fn path_in_bundle(&self) -> &str;

    /// URL the file is served from, used for import-partial detection
    fn source_url(&self) -> &str;

    fn contents(&self) -> &str;

    /// Source map JSON produced by whatever generated this file, if any
    fn existing_source_map(&self) -> Option<&str>;

    fn report_error(&mut self, error: FileError);

    fn add_stylesheet(&mut self, stylesheet: OutputStylesheet);
}

/// An [`InputFile`] held in memory that records what it is given
#[derive(Debug, Clone, Default)]
pub struct MemoryFile {
    path: String,
    source_url: String,
    contents: String,
    existing_map: Option<String>,
    pub errors: Vec<FileError>,
    pub stylesheets: Vec<OutputStylesheet>,
}

impl MemoryFile {
    /// A file whose path in bundle and source URL are both `path`
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            source_url: path.clone(),
            path,
            contents: contents.into(),
            ..Self::default()
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_source_map(mut self, map: impl Into<String>) -> Self {
        self.existing_map = Some(map.into());
        self
    }
}

impl InputFile for MemoryFile {
    fn path_in_bundle(&self) -> &str {
        &self.path
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn existing_source_map(&self) -> Option<&str> {
        self.existing_map.as_deref()
    }

    fn report_error(&mut self, error: FileError) {
        self.errors.push(error);
    }

    fn add_stylesheet(&mut self, stylesheet: OutputStylesheet) {
        self.stylesheets.push(stylesheet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_file_defaults() {
        let file = MemoryFile::new("client/a.css", ".a {}");
        assert_eq!(file.path_in_bundle(), "client/a.css");
        assert_eq!(file.source_url(), "client/a.css");
        assert_eq!(file.contents(), ".a {}");
        assert!(file.existing_source_map().is_none());
    }

    #[test]
    fn test_memory_file_records() {
        let mut file = MemoryFile::new("a.css", "")
            .with_source_url("/a.css")
            .with_source_map("{}");
        file.report_error(FileError::new("boom").at(1, 2));
        file.add_stylesheet(OutputStylesheet {
            data: ".a{}".to_string(),
            source_map: None,
            path: None,
        });

        assert_eq!(file.source_url(), "/a.css");
        assert_eq!(file.existing_source_map(), Some("{}"));
        assert_eq!(file.errors, vec![FileError::new("boom").at(1, 2)]);
        assert_eq!(file.stylesheets.len(), 1);
    }

    #[test]
    fn test_file_error_diagnostic() {
        let diagnostic = FileError::new("Unknown word").at(3, 4).to_diagnostic("a.css");
        assert_eq!(diagnostic.problem.as_deref(), Some("Unknown word"));
        assert_eq!(diagnostic.location.map(|l| (l.line, l.column)), Some((3, 4)));

        let diagnostic = FileError::new("boom").to_diagnostic("a.css");
        assert!(diagnostic.location.is_none());
    }
}

//! Error types for the bundling pipeline.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Per-file problems ([`CssSyntaxError`], [`TransformError`]) are carried
//! as values and reported against the offending file. Only [`BundleError`]
//! stops a build.

use std::path::PathBuf;

use stylemerge_error_reporting::{
    DiagnosticKind, DiagnosticMessage, DiagnosticMessageBuilder, SourceLocation, render_excerpt,
};
use thiserror::Error;

/// Name shown for CSS that did not come from a named file
pub const ANONYMOUS_INPUT: &str = "<css input>";

/// A stylesheet that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}:{column}: {reason}", .file.as_deref().unwrap_or(ANONYMOUS_INPUT))]
pub struct CssSyntaxError {
    /// What went wrong, without position information
    pub reason: String,
    /// Name of the stylesheet, when known
    pub file: Option<String>,
    /// 1-based line
    pub line: usize,
    /// 1-based column, in characters
    pub column: usize,
    /// Text that was being parsed, kept for excerpts
    pub input: Option<String>,
}

impl CssSyntaxError {
    /// Render the offending line of the input with the position labelled.
    ///
    /// Returns an empty string when the input text is not available.
    pub fn show_source_code(&self) -> String {
        let Some(input) = &self.input else {
            return String::new();
        };
        let location = self.location();
        render_excerpt(DiagnosticKind::Error, &self.reason, &location, input, &self.reason)
            .unwrap_or_default()
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            file: self.file.clone().unwrap_or_else(|| ANONYMOUS_INPUT.to_string()),
            line: self.line,
            column: self.column,
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        DiagnosticMessageBuilder::error("CSS Syntax Error")
            .with_code("SM-1-1")
            .problem(self.reason.clone())
            .build()
            .at(self.location())
    }
}

/// Failure of one file's transform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Syntax(#[from] CssSyntaxError),

    /// A plugin rejected the stylesheet. The position, when present, is
    /// 1-based and refers to the file's original text.
    #[error("{plugin}: {message}")]
    Plugin {
        plugin: String,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("{0}")]
    Other(String),
}

impl TransformError {
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::Plugin {
            plugin: plugin.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

/// Problems with the configuration file. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unknown plugin `{name}` in {path}")]
    UnknownPlugin { path: PathBuf, name: String },

    #[error("Invalid options for plugin `{name}` in {path}: {message}")]
    PluginOptions {
        path: PathBuf,
        name: String,
        message: String,
    },

    #[error("Unknown parser `{name}` in {path}")]
    UnknownParser { path: PathBuf, name: String },
}

impl ConfigError {
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        DiagnosticMessageBuilder::error("Invalid Configuration")
            .with_code("SM-4-1")
            .problem(self.to_string())
            .add_hint("Check the configuration file for typos or unsupported entries?")
            .build()
    }
}

/// Failure of the production minifier
#[derive(Debug, Error)]
#[error("Minification failed: {message}")]
pub struct MinifyError {
    pub message: String,
}

impl MinifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a whole bundle
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Minify(#[from] MinifyError),
}

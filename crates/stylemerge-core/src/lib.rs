//! Stylesheet bundling for application builds
//!
//! This crate takes the stylesheets contributed by every module of an
//! application, runs each through a configurable plugin chain, merges them
//! into one stylesheet with `@import` rules hoisted to the top, and produces
//! a source map that resolves positions in the bundle back to the authored
//! sources.
//!
//! # Architecture
//!
//! - [`CssBundler`] - Drives a whole build over a list of [`InputFile`]s
//! - [`transform()`] - Runs the plugin chain over one file
//! - [`merge_stylesheets`] - Stable partition of many sheets into one
//! - [`compose_source_map`] - Chains the merge map with per-file maps
//! - [`parser`] / [`stringify()`] - The stylesheet tree and its text form
//!
//! # Example
//!
//! ```
//! use stylemerge_core::{BuildMode, CollectingSink, CssBundler, InlineConfigLoader, MemoryFile, MinifyError};
//!
//! let minify = |css: &str| -> Result<Vec<String>, MinifyError> { Ok(vec![css.to_string()]) };
//! let bundler = CssBundler::new(InlineConfigLoader::none(), minify);
//!
//! let mut files = vec![
//!     MemoryFile::new("client/a.css", ".a { color: red }"),
//!     MemoryFile::new("client/b.css", "@import 'theme.css';"),
//! ];
//! let mut sink = CollectingSink::new();
//! bundler
//!     .process_files_for_bundle(&mut files, BuildMode::Development, &mut sink)
//!     .unwrap();
//!
//! let output = &files[0].stylesheets[0];
//! assert!(output.data.starts_with("@import 'theme.css';"));
//! assert!(output.source_map.is_some());
//! ```

pub mod ast;
pub mod bundle;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod file;
pub mod filter;
pub mod merge;
pub mod parser;
pub mod plugin;
pub mod plugins;
pub mod stringify;
pub mod transform;

// Re-export commonly used types
pub use ast::{AtRule, Comment, Declaration, Node, NodeMeta, Origin, Rule, RuleKind, Stylesheet};
pub use bundle::{BuildMode, BundleSummary, CssBundler, MERGED_STYLESHEET_PATH, Minifier};
pub use compose::{SourceLayer, compose_source_map};
pub use config::{
    BundleConfig, ConfigCache, ConfigLoader, FsConfigLoader, InlineConfigLoader, LoadedConfig,
    RawConfig,
};
pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
pub use error::{BundleError, ConfigError, CssSyntaxError, MinifyError, TransformError};
pub use file::{FileError, InputFile, MemoryFile, OutputStylesheet};
pub use filter::{ExcludedPackages, is_import_partial};
pub use merge::{MergeWarning, merge_stylesheets};
pub use parser::{ParseMode, ParseOptions, parse};
pub use plugin::{Plugin, PluginResult, PluginWarning, ProcessOptions, ProcessedCss, Processor};
pub use stringify::{OutputStyle, Stringified, StringifyOptions, stringify};
pub use transform::{TransformResult, transform};

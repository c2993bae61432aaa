/*
 * bundle.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet bundle orchestration.
 */

//! Stylesheet bundle orchestration.
//!
//! [`CssBundler::process_files_for_bundle`] drives one build:
//!
//! 1. load configuration (once per bundler)
//! 2. drop import partials
//! 3. transform and parse each remaining file in input order
//! 4. merge the parsed sheets, hoisting `@import`
//! 5. emit either the merged sheet with a composed source map
//!    (development) or the minifier's chunks (production)
//!
//! A problem with one file is reported on that file and the file's rules are
//! left out; the rest of the bundle is still produced. Only a broken
//! configuration or a failing minifier stops the build.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stylemerge_source_map::SourceMapConsumer;

use crate::ast::Stylesheet;
use crate::compose::{SourceLayer, compose_source_map};
use crate::config::{ConfigCache, ConfigLoader};
use crate::diagnostics::DiagnosticSink;
use crate::error::{BundleError, CssSyntaxError, MinifyError, TransformError};
use crate::file::{FileError, InputFile, OutputStylesheet};
use crate::filter::is_import_partial;
use crate::merge::merge_stylesheets;
use crate::parser::{ParseOptions, parse};
use crate::plugin::{Plugin, ProcessedCss};
use crate::stringify::{StringifyOptions, stringify};
use crate::transform::transform;

/// Name of the development-mode artifact
pub const MERGED_STYLESHEET_PATH: &str = "merged-stylesheets.css";

/// Which output the build produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Merged stylesheet with a source map, not minified
    #[default]
    Development,
    /// Minified chunks without source maps
    Production,
}

/// The production minifier.
///
/// Takes the merged stylesheet and returns the text of each output chunk,
/// in order.
pub trait Minifier {
    fn minify(&self, css: &str) -> Result<Vec<String>, MinifyError>;
}

impl<F> Minifier for F
where
    F: Fn(&str) -> Result<Vec<String>, MinifyError>,
{
    fn minify(&self, css: &str) -> Result<Vec<String>, MinifyError> {
        self(css)
    }
}

/// What one build did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSummary {
    /// Files passed in
    pub files: usize,
    /// Import partials left out
    pub partials: usize,
    /// Files whose transform or parse failed
    pub failed: usize,
    /// Stylesheets attached to the first file
    pub stylesheets: usize,
}

/// Bundles stylesheets into one artifact (or a few minified chunks)
pub struct CssBundler<L, M> {
    loader: L,
    minifier: M,
    config: ConfigCache,
}

impl<L, M> CssBundler<L, M>
where
    L: ConfigLoader,
    M: Minifier,
{
    pub fn new(loader: L, minifier: M) -> Self {
        Self {
            loader,
            minifier,
            config: ConfigCache::new(),
        }
    }

    /// Bundle `files`, attaching the output to the first of them.
    ///
    /// Files are processed and merged in slice order. Per-file errors are
    /// reported through [`InputFile::report_error`]; warnings go to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or, in
    /// production mode, if the minifier fails.
    pub fn process_files_for_bundle<F: InputFile>(
        &self,
        files: &mut [F],
        mode: BuildMode,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<BundleSummary, BundleError> {
        let config = self.config.get_or_load(&self.loader)?;

        let mut summary = BundleSummary {
            files: files.len(),
            ..BundleSummary::default()
        };
        if files.is_empty() {
            return Ok(summary);
        }

        tracing::debug!(stage = "Filtering", files = files.len(), "Bundling stylesheets");
        let selected: Vec<usize> = (0..files.len())
            .filter(|&index| !is_import_partial(files[index].source_url()))
            .collect();
        summary.partials = files.len() - selected.len();

        tracing::debug!(stage = "PerFileTransform", files = selected.len(), "Bundling stylesheets");
        let no_plugins: [Arc<dyn Plugin>; 0] = [];
        let mut asts = Vec::with_capacity(selected.len());
        let mut layers = Vec::with_capacity(selected.len());
        for index in selected {
            let file = &mut files[index];
            let path = file.path_in_bundle().to_string();
            let chain: &[Arc<dyn Plugin>] = if config.excluded_packages.contains(&path) {
                tracing::debug!(path = %path, "Package excluded from plugins");
                &no_plugins
            } else {
                &config.plugins
            };

            let result = transform(&*file, chain, config.parser, sink);
            let (ast, transform_map) = match result.outcome {
                Ok(processed) => match parse_transformed(&path, &processed) {
                    Ok(ast) => (ast, Some(processed.map)),
                    Err(report) => {
                        file.report_error(report);
                        summary.failed += 1;
                        (Stylesheet::placeholder(&path), None)
                    }
                },
                Err(err) => {
                    file.report_error(err.to_file_error());
                    summary.failed += 1;
                    (Stylesheet::placeholder(&path), None)
                }
            };

            asts.push(ast);
            layers.push(SourceLayer {
                path,
                contents: file.contents().to_string(),
                transform_map,
                existing_map: file.existing_source_map().map(str::to_string),
            });
        }

        tracing::debug!(stage = "Merging", sheets = asts.len(), "Bundling stylesheets");
        let merged = merge_stylesheets(asts, &mut |file, warning| {
            sink.warn(file, warning.to_diagnostic());
        });
        let stringified = stringify(&merged, &StringifyOptions::with_map(MERGED_STYLESHEET_PATH));

        let outputs = match mode {
            BuildMode::Development => {
                tracing::debug!(stage = "DevEmit", bytes = stringified.code.len(), "Bundling stylesheets");
                let source_map = match stringified.map {
                    Some(map) if !stringified.code.is_empty() => Some(compose_source_map(map, &layers)),
                    _ => None,
                };
                vec![OutputStylesheet {
                    data: stringified.code,
                    source_map,
                    path: Some(MERGED_STYLESHEET_PATH.to_string()),
                }]
            }
            BuildMode::Production => {
                tracing::debug!(stage = "ProdMinifyEmit", bytes = stringified.code.len(), "Bundling stylesheets");
                self.minifier
                    .minify(&stringified.code)?
                    .into_iter()
                    .map(|data| OutputStylesheet {
                        data,
                        source_map: None,
                        path: None,
                    })
                    .collect()
            }
        };

        summary.stylesheets = outputs.len();
        for output in outputs {
            files[0].add_stylesheet(output);
        }

        tracing::debug!(
            failed = summary.failed,
            stylesheets = summary.stylesheets,
            "Bundle complete"
        );
        Ok(summary)
    }
}

/// Parse a file's transformed text for merging.
///
/// A failure is reported at the corresponding position of the file's
/// original text when the transform map knows it.
fn parse_transformed(path: &str, processed: &ProcessedCss) -> Result<Stylesheet, FileError> {
    let err = match parse(&processed.css, &ParseOptions::new(path)) {
        Ok(ast) => return Ok(ast),
        Err(err) => err,
    };

    let original = original_position(&err, processed);
    let mut report = TransformError::Syntax(err).to_file_error();
    if let Some((line, column)) = original {
        report = report.at(line, column);
    }
    Err(report)
}

fn original_position(err: &CssSyntaxError, processed: &ProcessedCss) -> Option<(usize, usize)> {
    let consumer = SourceMapConsumer::new(&processed.map).ok()?;
    let position = consumer.original_position_for(err.line.checked_sub(1)?, err.column.checked_sub(1)?)?;
    Some((position.row + 1, position.column + 1))
}

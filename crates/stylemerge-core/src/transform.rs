/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-file transform runner.
 */

//! Per-file transform runner.
//!
//! Runs a plugin chain over one input file. The chain is asynchronous but
//! the runner blocks until it finishes, so files are transformed strictly
//! one after another in input order. Failures are returned inside the
//! [`TransformResult`] rather than propagated, letting the caller carry on
//! with the remaining files.

use std::sync::Arc;

use crate::diagnostics::DiagnosticSink;
use crate::error::TransformError;
use crate::file::{FileError, InputFile};
use crate::parser::ParseMode;
use crate::plugin::{Plugin, ProcessOptions, ProcessedCss, Processor};

/// Outcome of transforming one file
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Path in bundle of the file
    pub path: String,
    pub outcome: Result<ProcessedCss, TransformError>,
}

impl TransformResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Transform one file with `chain`.
///
/// Plugin warnings are written to `sink`. An empty chain passes the file
/// through (after checking that it parses).
pub fn transform(
    file: &dyn InputFile,
    chain: &[Arc<dyn Plugin>],
    parser: ParseMode,
    sink: &mut dyn DiagnosticSink,
) -> TransformResult {
    let path = file.path_in_bundle().to_string();
    let processor = Processor::new(chain.to_vec());
    let options = ProcessOptions {
        from: path.clone(),
        parser,
    };

    tracing::debug!(path = %path, plugins = chain.len(), "Transforming file");
    let outcome = pollster::block_on(processor.process(file.contents(), &options));

    match &outcome {
        Ok(processed) => {
            for warning in &processed.warnings {
                sink.warn(&path, warning.to_diagnostic(&path));
            }
        }
        Err(err) => tracing::debug!(path = %path, error = %err, "Transform failed"),
    }

    TransformResult { path, outcome }
}

impl TransformError {
    /// The report to send to the file this error belongs to.
    ///
    /// Syntax errors carry their position, a `Css Syntax Error.` banner and
    /// the message again followed by an excerpt of the source.
    /// Plugin errors carry a position when the plugin gave one. Anything
    /// else is reported by message only.
    pub fn to_file_error(&self) -> FileError {
        match self {
            TransformError::Syntax(err) => {
                let excerpt = err.show_source_code();
                FileError::new(format!("{err}\n\nCss Syntax Error.\n\n{err}\n{excerpt}"))
                    .at(err.line, err.column)
            }
            TransformError::Plugin {
                line: Some(line),
                column: Some(column),
                ..
            } => FileError::new(self.to_string()).at(*line, *column),
            _ => FileError::new(self.to_string()),
        }
    }
}

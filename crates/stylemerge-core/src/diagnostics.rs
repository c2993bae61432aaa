/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Warning channel for the bundling pipeline.
 */

//! Warning channel for the bundling pipeline.
//!
//! Warnings never fail a build and are not attributed to a file handle the
//! way errors are. They go to a [`DiagnosticSink`], which the host decides
//! how to present.

use stylemerge_error_reporting::DiagnosticMessage;

/// Append-only stream of non-fatal diagnostics
pub trait DiagnosticSink {
    /// Record a warning about the file with the given path in bundle
    fn warn(&mut self, file: &str, message: DiagnosticMessage);
}

/// Keeps every warning in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub warnings: Vec<(String, DiagnosticMessage)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings about one file, in the order they were reported
    pub fn for_file(&self, file: &str) -> Vec<&DiagnosticMessage> {
        self.warnings
            .iter()
            .filter(|(f, _)| f == file)
            .map(|(_, message)| message)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&mut self, file: &str, message: DiagnosticMessage) {
        self.warnings.push((file.to_string(), message));
    }
}

/// Forwards warnings to `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&mut self, file: &str, message: DiagnosticMessage) {
        tracing::warn!(
            file = file,
            code = message.code.as_deref().unwrap_or(""),
            "{}",
            message.problem.as_deref().unwrap_or(&message.title)
        );
    }
}

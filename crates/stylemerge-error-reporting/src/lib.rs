//! Error reporting and diagnostic messages for stylemerge.
//!
//! Diagnostics are the user-facing side of the bundler: per-file errors
//! reported against an input stylesheet, and warnings written to the
//! operator's diagnostic stream. Internal logging goes through `tracing`
//! instead.
//!
//! # Architecture
//!
//! - [`DiagnosticMessage`]: The main message structure (title, kind, code,
//!   problem, details, hints, optional source location)
//! - [`DiagnosticMessageBuilder`]: Tidyverse-style builder for messages
//! - [`catalog`]: Stable error codes (`SM-<subsystem>-<number>`)
//! - [`excerpt`]: ariadne-rendered source excerpts pointing at a line/column
//!
//! # Example
//!
//! ```
//! use stylemerge_error_reporting::DiagnosticMessageBuilder;
//!
//! let warning = DiagnosticMessageBuilder::warning("Ignored @charset rule")
//!     .with_code("SM-3-2")
//!     .problem("Only UTF-8 stylesheets are supported")
//!     .add_hint("Remove the @charset rule or save the file as UTF-8?")
//!     .build();
//!
//! let text = warning.to_text(None);
//! assert!(text.contains("Warning: Ignored @charset rule"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod excerpt;

// Re-export main types for convenience
pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, SourceLocation};
pub use excerpt::render_excerpt;

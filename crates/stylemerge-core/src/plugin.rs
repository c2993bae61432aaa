/*
 * plugin.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet plugin chain.
 */

//! Stylesheet plugin chain.
//!
//! - [`Plugin`] - The trait implemented by every stylesheet transformation
//! - [`Processor`] - Runs an ordered chain of plugins over one stylesheet
//!
//! A processor parses its input with positions, hands the tree to each
//! plugin in insertion order and stringifies the result together with a
//! map from the transformed text back to the input text.

use std::sync::Arc;

use async_trait::async_trait;
use stylemerge_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use stylemerge_source_map::SourceMap;

use crate::ast::{Node, Stylesheet};
use crate::error::TransformError;
use crate::parser::{ParseMode, ParseOptions, parse};
use crate::stringify::{StringifyOptions, identity_map, stringify};

/// A non-fatal message produced by a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginWarning {
    pub plugin: String,
    pub text: String,
    /// 1-based position in the input text, when the warning is tied to a node
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl PluginWarning {
    pub fn to_diagnostic(&self, file: &str) -> DiagnosticMessage {
        let builder = DiagnosticMessageBuilder::warning("Plugin Warning")
            .with_code("SM-2-1")
            .problem(self.text.clone())
            .add_info(format!("Reported by `{}`", self.plugin));
        match (self.line, self.column) {
            (Some(line), Some(column)) => builder.at_location(file, line, column).build(),
            _ => builder.build(),
        }
    }
}

impl std::fmt::Display for PluginWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, "{}:{}: ", line, column)?;
        }
        write!(f, "{} ({})", self.text, self.plugin)
    }
}

/// Collects what plugins report while a chain runs
#[derive(Debug, Clone, Default)]
pub struct PluginResult {
    warnings: Vec<PluginWarning>,
}

impl PluginResult {
    /// Record a warning, positioned at `node` when given
    pub fn warn(&mut self, plugin: &str, text: impl Into<String>, node: Option<&Node>) {
        let start = node.and_then(|n| n.meta().span).map(|span| span.start);
        self.warnings.push(PluginWarning {
            plugin: plugin.to_string(),
            text: text.into(),
            line: start.map(|s| s.row + 1),
            column: start.map(|s| s.column + 1),
        });
    }

    pub fn warnings(&self) -> &[PluginWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<PluginWarning> {
        self.warnings
    }
}

/// Trait for stylesheet transformations.
///
/// Plugins are `Send + Sync` so one configured chain can be shared by every
/// file of a build.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name used in configuration files and logs
    fn name(&self) -> &str;

    /// Transform the stylesheet in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the stylesheet cannot be processed. The
    /// processor stops at the first error.
    async fn run(&self, root: &mut Stylesheet, result: &mut PluginResult) -> Result<(), TransformError>;
}

/// Options for [`Processor::process`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Name of the input, used as the source of the returned map
    pub from: String,
    pub parser: ParseMode,
}

/// Output of a processor run
#[derive(Debug, Clone)]
pub struct ProcessedCss {
    pub css: String,
    /// Map from `css` back to the processor's input
    pub map: SourceMap,
    pub warnings: Vec<PluginWarning>,
}

/// An ordered chain of plugins.
#[derive(Clone, Default)]
pub struct Processor {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Processor {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// List the names of all plugins in execution order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Parse `css`, run every plugin in order and stringify the result.
    ///
    /// With no plugins and the strict parser the input text is returned
    /// unchanged, along with a map from each node to itself.
    ///
    /// # Errors
    ///
    /// Returns the syntax error of the input or the first plugin error.
    pub async fn process(
        &self,
        css: &str,
        options: &ProcessOptions,
    ) -> Result<ProcessedCss, TransformError> {
        let parse_options = ParseOptions::new(options.from.clone()).with_mode(options.parser);
        let mut root = parse(css, &parse_options)?;

        if self.plugins.is_empty() && options.parser == ParseMode::Strict {
            return Ok(ProcessedCss {
                css: css.to_string(),
                map: identity_map(&root, Some(options.from.clone())).to_source_map(),
                warnings: Vec::new(),
            });
        }

        let mut result = PluginResult::default();
        for plugin in &self.plugins {
            tracing::debug!(plugin = plugin.name(), file = %options.from, "Running plugin");
            plugin.run(&mut root, &mut result).await?;
        }

        let output = stringify(&root, &StringifyOptions::with_map(options.from.clone()));
        let map = match output.map {
            Some(generator) => generator.to_source_map(),
            None => SourceMap::empty(Some(options.from.clone())),
        };

        Ok(ProcessedCss {
            css: output.code,
            map,
            warnings: result.into_warnings(),
        })
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Declaration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stylemerge_source_map::SourceMapConsumer;

    /// Appends a declaration to every rule and records its run order
    struct TaggingPlugin {
        name: &'static str,
        counter: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Plugin for TaggingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, root: &mut Stylesheet, result: &mut PluginResult) -> Result<(), TransformError> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.name);
            for node in &mut root.nodes {
                if let Node::Rule(rule) = node {
                    rule.nodes.push(Declaration::new("--tag", self.name).into());
                }
            }
            result.warn(self.name, "tagged", root.nodes.first());
            Ok(())
        }
    }

    struct FailingPlugin;

    #[async_trait]
    impl Plugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self, _root: &mut Stylesheet, _result: &mut PluginResult) -> Result<(), TransformError> {
            Err(TransformError::plugin("failing", "Test failure"))
        }
    }

    fn options(from: &str) -> ProcessOptions {
        ProcessOptions {
            from: from.to_string(),
            parser: ParseMode::Strict,
        }
    }

    #[test]
    fn test_empty_chain_is_verbatim() {
        let css = ".a{color:red}\n\n  .b { top: 0 }";
        let out = pollster::block_on(Processor::default().process(css, &options("a.css"))).unwrap();
        assert_eq!(out.css, css);
        assert!(out.warnings.is_empty());

        let consumer = SourceMapConsumer::new(&out.map).unwrap();
        let b = consumer.original_position_for(2, 2).unwrap();
        assert_eq!((b.source.as_str(), b.row, b.column), ("a.css", 2, 2));
    }

    #[test]
    fn test_plugins_run_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let processor = Processor::new(vec![
            Arc::new(TaggingPlugin {
                name: "first",
                counter: counter.clone(),
                order: order.clone(),
            }),
            Arc::new(TaggingPlugin {
                name: "second",
                counter: counter.clone(),
                order: order.clone(),
            }),
        ]);
        assert_eq!(processor.plugin_names(), vec!["first", "second"]);

        let out = pollster::block_on(processor.process("\n.a { color: red }", &options("a.css"))).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(
            out.css,
            ".a {\n  color: red;\n  --tag: first;\n  --tag: second;\n}"
        );

        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].line, Some(2));
        assert_eq!(out.warnings[0].column, Some(1));
        assert_eq!(out.warnings[0].to_string(), "2:1: tagged (first)");
    }

    #[test]
    fn test_transformed_map_points_at_input() {
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let processor = Processor::new(vec![Arc::new(TaggingPlugin {
            name: "only",
            counter,
            order,
        })]);
        let out = pollster::block_on(processor.process("\n\n.a{color:red}", &options("a.css"))).unwrap();

        let consumer = SourceMapConsumer::new(&out.map).unwrap();
        let decl = consumer.original_position_for(1, 2).unwrap();
        assert_eq!((decl.row, decl.column), (2, 3));
    }

    #[test]
    fn test_plugin_error_stops_chain() {
        let counter = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let processor = Processor::new(vec![
            Arc::new(FailingPlugin),
            Arc::new(TaggingPlugin {
                name: "never",
                counter: counter.clone(),
                order,
            }),
        ]);

        let err = pollster::block_on(processor.process(".a {}", &options("a.css"))).unwrap_err();
        assert!(matches!(err, TransformError::Plugin { ref plugin, .. } if plugin == "failing"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_syntax_error_is_returned() {
        let err = pollster::block_on(Processor::default().process(".a {", &options("a.css"))).unwrap_err();
        let TransformError::Syntax(syntax) = err else {
            panic!("expected syntax error");
        };
        assert_eq!(syntax.reason, "Unclosed block");
        assert_eq!(syntax.file.as_deref(), Some("a.css"));
    }

    #[test]
    fn test_safe_parser_restringifies() {
        let options = ProcessOptions {
            from: "a.css".to_string(),
            parser: ParseMode::Safe,
        };
        let out = pollster::block_on(Processor::default().process(".a { color: red", &options)).unwrap();
        assert_eq!(out.css, ".a {\n  color: red;\n}");
    }

    #[test]
    fn test_warning_diagnostic() {
        let warning = PluginWarning {
            plugin: "autoprefixer".to_string(),
            text: "grid-gap is deprecated".to_string(),
            line: Some(3),
            column: Some(5),
        };
        let diagnostic = warning.to_diagnostic("client/a.css");
        assert_eq!(diagnostic.code.as_deref(), Some("SM-2-1"));
        let location = diagnostic.location.unwrap();
        assert_eq!((location.file.as_str(), location.line, location.column), ("client/a.css", 3, 5));
    }
}

//! Nested rule flattening.
//!
//! Rewrites nested style rules into plain CSS:
//!
//! ```css
//! .card { color: red; &:hover { color: blue } .title { margin: 0 } }
//! ```
//!
//! becomes `.card { color: red }`, `.card:hover { color: blue }` and
//! `.card .title { margin: 0 }`. Selector lists multiply out, and
//! conditional group rules (`@media`, `@supports`, ...) nested in a rule
//! are lifted out with the rule's selector moved inside them.

use async_trait::async_trait;

use crate::ast::{AtRule, Node, Rule, Stylesheet};
use crate::error::TransformError;
use crate::plugin::{Plugin, PluginResult};

const CONDITIONAL_RULES: &[&str] = &["media", "supports", "container", "layer"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Nesting;

impl Nesting {
    pub const NAME: &'static str = "nesting";
}

#[async_trait]
impl Plugin for Nesting {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, root: &mut Stylesheet, _result: &mut PluginResult) -> Result<(), TransformError> {
        let nodes = std::mem::take(&mut root.nodes);
        root.nodes = flatten_nodes(nodes, None)?;
        Ok(())
    }
}

fn is_conditional(at: &AtRule) -> bool {
    at.nodes.is_some()
        && CONDITIONAL_RULES
            .iter()
            .any(|name| at.name.eq_ignore_ascii_case(name))
}

/// Flatten a node list. `parent` holds the resolved selectors of the
/// enclosing rule, if any.
fn flatten_nodes(nodes: Vec<Node>, parent: Option<&[String]>) -> Result<Vec<Node>, TransformError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Rule(rule) => out.extend(flatten_rule(rule, parent)?),
            Node::AtRule(mut at) if at.nodes.is_some() => {
                if let Some(children) = at.nodes.take() {
                    at.nodes = Some(flatten_nodes(children, parent)?);
                }
                out.push(Node::AtRule(at));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Flatten one rule into itself followed by everything lifted out of it
fn flatten_rule(rule: Rule, parent: Option<&[String]>) -> Result<Vec<Node>, TransformError> {
    let selectors = resolve_selectors(&rule, parent)?;
    let mut own = Vec::new();
    let mut lifted = Vec::new();

    for child in rule.nodes {
        match child {
            Node::Rule(nested) => lifted.extend(flatten_rule(nested, Some(&selectors))?),
            Node::AtRule(mut at) if is_conditional(&at) => {
                // Declarations directly inside the group rule apply to the
                // enclosing selector
                let body = at.nodes.take().unwrap_or_default();
                let wrapper = Rule {
                    selector: selectors.join(", "),
                    nodes: body,
                    meta: at.meta.clone(),
                };
                at.nodes = Some(flatten_rule_resolved(wrapper, &selectors)?);
                lifted.push(Node::AtRule(at));
            }
            other => own.push(other),
        }
    }

    let mut out = Vec::with_capacity(1 + lifted.len());
    if !own.is_empty() || lifted.is_empty() {
        out.push(Node::Rule(Rule {
            selector: selectors.join(", "),
            nodes: own,
            meta: rule.meta,
        }));
    }
    out.extend(lifted);
    Ok(out)
}

/// Like [`flatten_rule`] for a rule whose selectors are already resolved
fn flatten_rule_resolved(rule: Rule, selectors: &[String]) -> Result<Vec<Node>, TransformError> {
    let mut own = Vec::new();
    let mut lifted = Vec::new();
    for child in rule.nodes {
        match child {
            Node::Rule(nested) => lifted.extend(flatten_rule(nested, Some(selectors))?),
            Node::AtRule(mut at) if is_conditional(&at) => {
                let body = at.nodes.take().unwrap_or_default();
                let wrapper = Rule {
                    selector: rule.selector.clone(),
                    nodes: body,
                    meta: at.meta.clone(),
                };
                at.nodes = Some(flatten_rule_resolved(wrapper, selectors)?);
                lifted.push(Node::AtRule(at));
            }
            other => own.push(other),
        }
    }

    let mut out = Vec::with_capacity(1 + lifted.len());
    if !own.is_empty() {
        out.push(Node::Rule(Rule {
            selector: rule.selector,
            nodes: own,
            meta: rule.meta,
        }));
    }
    out.extend(lifted);
    Ok(out)
}

fn resolve_selectors(rule: &Rule, parent: Option<&[String]>) -> Result<Vec<String>, TransformError> {
    let parts = split_selector_list(&rule.selector);
    if parts.iter().any(|part| part.is_empty()) {
        let start = rule.meta.span.map(|span| span.start);
        return Err(TransformError::Plugin {
            plugin: Nesting::NAME.to_string(),
            message: format!("Empty selector in selector list `{}`", rule.selector),
            line: start.map(|s| s.row + 1),
            column: start.map(|s| s.column + 1),
        });
    }

    let Some(parents) = parent else {
        return Ok(parts);
    };

    let mut resolved = Vec::with_capacity(parts.len() * parents.len());
    for part in &parts {
        for parent in parents {
            if part.contains('&') {
                resolved.push(part.replace('&', parent));
            } else {
                resolved.push(format!("{parent} {part}"));
            }
        }
    }
    Ok(resolved)
}

/// Split a selector list on top-level commas
fn split_selector_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for ch in selector.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current.clear();
                    continue;
                }
                _ => {}
            },
        }
        current.push(ch);
    }
    parts.push(current.trim().to_string());
    parts
}

/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet syntax tree.
 */

//! Stylesheet syntax tree.
//!
//! The tree is deliberately small: style rules, at-rules, declarations and
//! comments. Every node remembers where it came from (`span`, in the text
//! it was parsed from) and which input file it belongs to (`origin`), so a
//! merged tree can still be stringified with an accurate source map.

use std::sync::Arc;

use stylemerge_source_map::Range;

/// Shared provenance tag: the path in bundle of the file a node came from
pub type Origin = Arc<str>;

/// Position and provenance carried by every node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMeta {
    /// Range in the text this node was parsed from
    pub span: Option<Range>,
    /// Path of the file the node belongs to
    pub origin: Option<Origin>,
}

/// How the merger treats a top-level node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `@import`, hoisted to the top of the bundle
    Import,
    /// An ordinary style rule
    Regular,
    /// Any other at-rule, comment or stray declaration
    Other,
}

/// A parsed stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
    /// Path of the file this sheet was parsed from
    pub source: Option<Origin>,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>, source: Option<Origin>) -> Self {
        Self { nodes, source }
    }

    /// The empty sheet that stands in for a file that failed to parse
    pub fn placeholder(path: &str) -> Self {
        Self {
            nodes: Vec::new(),
            source: Some(Origin::from(path)),
        }
    }

    /// Visit every node list (the root and each block body), outermost first
    pub fn walk_containers(&mut self, f: &mut dyn FnMut(&mut Vec<Node>)) {
        walk_containers(&mut self.nodes, f);
    }

    /// Visit every node, parents before children
    pub fn walk(&self, f: &mut dyn FnMut(&Node)) {
        fn visit(nodes: &[Node], f: &mut dyn FnMut(&Node)) {
            for node in nodes {
                f(node);
                if let Some(children) = node.children() {
                    visit(children, f);
                }
            }
        }
        visit(&self.nodes, f);
    }
}

fn walk_containers(nodes: &mut Vec<Node>, f: &mut dyn FnMut(&mut Vec<Node>)) {
    f(nodes);
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            walk_containers(children, f);
        }
    }
}

/// A node in the stylesheet tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
}

/// `selector { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub meta: NodeMeta,
}

/// `@name params;` or `@name params { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    /// `None` for statement at-rules such as `@import`
    pub nodes: Option<Vec<Node>>,
    pub meta: NodeMeta,
}

/// `prop: value [!important]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
    pub important: bool,
    pub meta: NodeMeta,
}

/// `/* text */`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub meta: NodeMeta,
}

impl Rule {
    pub fn new(selector: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            selector: selector.into(),
            nodes,
            meta: NodeMeta::default(),
        }
    }
}

impl AtRule {
    pub fn new(name: impl Into<String>, params: impl Into<String>, nodes: Option<Vec<Node>>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            nodes,
            meta: NodeMeta::default(),
        }
    }
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
            important: false,
            meta: NodeMeta::default(),
        }
    }
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: NodeMeta::default(),
        }
    }
}

impl Node {
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Node::Rule(n) => &n.meta,
            Node::AtRule(n) => &n.meta,
            Node::Declaration(n) => &n.meta,
            Node::Comment(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Node::Rule(n) => &mut n.meta,
            Node::AtRule(n) => &mut n.meta,
            Node::Declaration(n) => &mut n.meta,
            Node::Comment(n) => &mut n.meta,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Node::AtRule(at) if at.name.eq_ignore_ascii_case("import") => RuleKind::Import,
            Node::Rule(_) => RuleKind::Regular,
            _ => RuleKind::Other,
        }
    }

    pub fn is_import(&self) -> bool {
        self.kind() == RuleKind::Import
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&rule.nodes),
            Node::AtRule(at) => at.nodes.as_ref(),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&mut rule.nodes),
            Node::AtRule(at) => at.nodes.as_mut(),
            _ => None,
        }
    }

    /// Copy span and origin from another node, for nodes a plugin derives
    /// from an existing one
    pub fn with_meta_of(mut self, other: &Node) -> Self {
        *self.meta_mut() = other.meta().clone();
        self
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<AtRule> for Node {
    fn from(at: AtRule) -> Self {
        Node::AtRule(at)
    }
}

impl From<Declaration> for Node {
    fn from(decl: Declaration) -> Self {
        Node::Declaration(decl)
    }
}

impl From<Comment> for Node {
    fn from(comment: Comment) -> Self {
        Node::Comment(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_dispatch() {
        let import: Node = AtRule::new("import", "'x'", None).into();
        let upper: Node = AtRule::new("IMPORT", "'x'", None).into();
        let media: Node = AtRule::new("media", "print", Some(vec![])).into();
        let rule: Node = Rule::new(".a", vec![]).into();
        let comment: Node = Comment::new("x").into();

        assert_eq!(import.kind(), RuleKind::Import);
        assert_eq!(upper.kind(), RuleKind::Import);
        assert_eq!(media.kind(), RuleKind::Other);
        assert_eq!(rule.kind(), RuleKind::Regular);
        assert_eq!(comment.kind(), RuleKind::Other);
    }

    #[test]
    fn test_placeholder_is_empty_and_tagged() {
        let sheet = Stylesheet::placeholder("client/broken.css");
        assert!(sheet.nodes.is_empty());
        assert_eq!(sheet.source.as_deref(), Some("client/broken.css"));
    }

    #[test]
    fn test_walk_visits_nested_nodes() {
        let sheet = Stylesheet::new(
            vec![
                AtRule::new(
                    "media",
                    "print",
                    Some(vec![Rule::new(".a", vec![Declaration::new("color", "red").into()]).into()]),
                )
                .into(),
            ],
            None,
        );

        let mut count = 0;
        sheet.walk(&mut |_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_walk_containers_mutates_bodies() {
        let mut sheet = Stylesheet::new(
            vec![Rule::new(".a", vec![Declaration::new("color", "red").into()]).into()],
            None,
        );
        sheet.walk_containers(&mut |nodes| nodes.retain(|n| !matches!(n, Node::Declaration(_))));

        let Node::Rule(rule) = &sheet.nodes[0] else {
            panic!("expected rule");
        };
        assert!(rule.nodes.is_empty());
    }
}

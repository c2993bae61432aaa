//! Vendor prefixing from a fixed support table.
//!
//! Adds prefixed copies of declarations that still need them and warns about
//! properties that have been superseded. The table is fixed; there is no
//! browser-list resolution.

use async_trait::async_trait;

use crate::ast::{Declaration, Node, Stylesheet};
use crate::error::TransformError;
use crate::plugin::{Plugin, PluginResult};

/// Properties that need prefixed copies
const PROPERTY_PREFIXES: &[(&str, &[&str])] = &[
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("box-decoration-break", &["-webkit-"]),
    ("hyphens", &["-webkit-", "-ms-"]),
    ("mask", &["-webkit-"]),
    ("mask-image", &["-webkit-"]),
    ("text-size-adjust", &["-webkit-", "-moz-", "-ms-"]),
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
];

/// `(property, value)` pairs whose value needs prefixed copies
const VALUE_PREFIXES: &[(&str, &str, &[&str])] = &[
    ("position", "sticky", &["-webkit-"]),
    ("width", "fit-content", &["-moz-"]),
    ("height", "fit-content", &["-moz-"]),
];

/// Superseded properties and their replacements
const DEPRECATED: &[(&str, &str)] = &[
    ("grid-gap", "gap"),
    ("grid-row-gap", "row-gap"),
    ("grid-column-gap", "column-gap"),
    ("word-wrap", "overflow-wrap"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Autoprefixer;

impl Autoprefixer {
    pub const NAME: &'static str = "autoprefixer";
}

/// Prefixed variants of `decl`, in insertion order
fn prefixed_variants(decl: &Declaration) -> Vec<Declaration> {
    let prop = decl.prop.to_ascii_lowercase();
    let value = decl.value.to_ascii_lowercase();
    let mut variants = Vec::new();

    if let Some((_, prefixes)) = PROPERTY_PREFIXES.iter().find(|(p, _)| *p == prop) {
        for prefix in *prefixes {
            variants.push(Declaration {
                prop: format!("{prefix}{prop}"),
                ..decl.clone()
            });
        }
    }

    if let Some((_, _, prefixes)) = VALUE_PREFIXES
        .iter()
        .find(|(p, v, _)| *p == prop && *v == value)
    {
        for prefix in *prefixes {
            variants.push(Declaration {
                value: format!("{prefix}{value}"),
                ..decl.clone()
            });
        }
    }

    variants
}

fn has_declaration(nodes: &[Node], prop: &str, value: &str) -> bool {
    nodes.iter().any(|node| {
        matches!(node, Node::Declaration(d) if d.prop.eq_ignore_ascii_case(prop) && d.value == value)
    })
}

#[async_trait]
impl Plugin for Autoprefixer {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, root: &mut Stylesheet, result: &mut PluginResult) -> Result<(), TransformError> {
        root.walk_containers(&mut |nodes| {
            let mut index = 0;
            while index < nodes.len() {
                let Node::Declaration(decl) = &nodes[index] else {
                    index += 1;
                    continue;
                };

                let prop = decl.prop.to_ascii_lowercase();
                if let Some((_, replacement)) = DEPRECATED.iter().find(|(p, _)| *p == prop) {
                    result.warn(
                        Self::NAME,
                        format!("`{prop}` is deprecated, use `{replacement}` instead"),
                        Some(&nodes[index]),
                    );
                }

                let additions: Vec<Declaration> = prefixed_variants(decl)
                    .into_iter()
                    .filter(|variant| !has_declaration(&nodes[..], &variant.prop, &variant.value))
                    .collect();
                for addition in additions {
                    nodes.insert(index, Node::Declaration(addition));
                    index += 1;
                }
                index += 1;
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse};
    use crate::stringify::{StringifyOptions, stringify};

    fn run(css: &str) -> (String, PluginResult) {
        let mut sheet = parse(css, &ParseOptions::new("a.css")).unwrap();
        let mut result = PluginResult::default();
        pollster::block_on(Autoprefixer.run(&mut sheet, &mut result)).unwrap();
        (stringify(&sheet, &StringifyOptions::default()).code, result)
    }

    #[test]
    fn test_prefixes_properties() {
        let (out, result) = run(".a { user-select: none; color: red }");
        assert_eq!(
            out,
            ".a {\n  -webkit-user-select: none;\n  -moz-user-select: none;\n  -ms-user-select: none;\n  user-select: none;\n  color: red;\n}"
        );
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_prefixes_values() {
        let (out, _) = run(".a { position: sticky }");
        assert_eq!(out, ".a {\n  position: -webkit-sticky;\n  position: sticky;\n}");
    }

    #[test]
    fn test_existing_prefix_is_not_duplicated() {
        let (out, _) = run(".a { -webkit-backdrop-filter: blur(2px); backdrop-filter: blur(2px) }");
        assert_eq!(
            out,
            ".a {\n  -webkit-backdrop-filter: blur(2px);\n  backdrop-filter: blur(2px);\n}"
        );
    }

    #[test]
    fn test_prefixed_copies_keep_position() {
        let mut sheet = parse(".a { appearance: none }", &ParseOptions::new("a.css")).unwrap();
        let mut result = PluginResult::default();
        pollster::block_on(Autoprefixer.run(&mut sheet, &mut result)).unwrap();

        let children = sheet.nodes[0].children().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].meta(), children[2].meta());
    }

    #[test]
    fn test_deprecated_property_warns() {
        let (_, result) = run(".a {\n  grid-gap: 1px;\n}");
        assert_eq!(result.warnings().len(), 1);
        let warning = &result.warnings()[0];
        assert_eq!(warning.plugin, "autoprefixer");
        assert_eq!(warning.text, "`grid-gap` is deprecated, use `gap` instead");
        assert_eq!((warning.line, warning.column), (Some(2), Some(3)));
    }
}

//! Comment removal.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ast::{Node, Stylesheet};
use crate::error::TransformError;
use crate::plugin::{Plugin, PluginResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StripCommentsOptions {
    /// Keep `/*! ... */` comments (licenses and the like)
    pub preserve_important: bool,
}

impl Default for StripCommentsOptions {
    fn default() -> Self {
        Self {
            preserve_important: true,
        }
    }
}

impl StripCommentsOptions {
    /// Read options from configuration; `null` and `true` mean defaults
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::Null | serde_json::Value::Bool(true) => Ok(Self::default()),
            other => Self::deserialize(other),
        }
    }
}

/// Removes comments at every nesting level
#[derive(Debug, Clone, Default)]
pub struct StripComments {
    options: StripCommentsOptions,
}

impl StripComments {
    pub const NAME: &'static str = "strip-comments";

    pub fn new(options: StripCommentsOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for StripComments {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, root: &mut Stylesheet, _result: &mut PluginResult) -> Result<(), TransformError> {
        let preserve = self.options.preserve_important;
        root.walk_containers(&mut |nodes| {
            nodes.retain(|node| match node {
                Node::Comment(comment) => preserve && comment.text.starts_with('!'),
                _ => true,
            });
        });
        Ok(())
    }
}

/*
 * plugins/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Built-in stylesheet plugins.
 */

//! Built-in stylesheet plugins.
//!
//! Configuration files name plugins; this module turns a name and its
//! options into a ready-to-run [`Plugin`]. Plugins are never fetched from a
//! registry, so an unknown name is a configuration error.

mod autoprefixer;
mod nesting;
mod strip_comments;

use std::sync::Arc;

pub use autoprefixer::Autoprefixer;
pub use nesting::Nesting;
pub use strip_comments::{StripComments, StripCommentsOptions};

use crate::plugin::Plugin;

/// Names accepted by [`builtin`]
pub const BUILTIN_PLUGINS: &[&str] = &[
    Autoprefixer::NAME,
    Nesting::NAME,
    StripComments::NAME,
];

/// Why [`builtin`] could not create a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginLookupError {
    Unknown,
    InvalidOptions(String),
}

/// Create a built-in plugin from its configured name and options.
///
/// `options` is `null` when the configuration gives none.
pub fn builtin(name: &str, options: &serde_json::Value) -> Result<Arc<dyn Plugin>, PluginLookupError> {
    match name {
        Autoprefixer::NAME => Ok(Arc::new(Autoprefixer)),
        Nesting::NAME => Ok(Arc::new(Nesting)),
        StripComments::NAME => {
            let options = StripCommentsOptions::from_value(options)
                .map_err(|e| PluginLookupError::InvalidOptions(e.to_string()))?;
            Ok(Arc::new(StripComments::new(options)))
        }
        _ => Err(PluginLookupError::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_names_resolve() {
        for name in BUILTIN_PLUGINS {
            let plugin = builtin(name, &serde_json::Value::Null).unwrap();
            assert_eq!(plugin.name(), *name);
        }
    }

    #[test]
    fn test_unknown_plugin() {
        assert_eq!(
            builtin("postcss-preset-env", &serde_json::Value::Null).err(),
            Some(PluginLookupError::Unknown)
        );
    }

    #[test]
    fn test_invalid_options() {
        let err = builtin("strip-comments", &json!({ "preserveImportant": "yes" })).err();
        assert!(matches!(err, Some(PluginLookupError::InvalidOptions(_))));
    }
}

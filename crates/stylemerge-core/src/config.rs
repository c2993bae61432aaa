/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bundler configuration.
 */

//! Bundler configuration.
//!
//! Configuration names the plugin chain and a couple of options:
//!
//! ```toml
//! [plugins]
//! nesting = true
//! autoprefixer = true
//! strip-comments = { preserveImportant = false }
//!
//! [options]
//! parser = "safe"
//! excludedPackages = ["acme:legacy-theme"]
//! ```
//!
//! A [`ConfigLoader`] finds and parses the file; [`BundleConfig::from_raw`]
//! resolves plugin names; [`ConfigCache`] makes sure that happens at most
//! once per process. Not finding any configuration is not an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::ExcludedPackages;
use crate::parser::ParseMode;
use crate::plugin::Plugin;
use crate::plugins::{PluginLookupError, builtin};

/// Configuration files looked for in the configuration directory, in order
pub const CONFIG_FILES: &[&str] = &[
    "stylemerge.toml",
    ".stylemergerc.json",
    ".stylemergerc.yaml",
    ".stylemergerc.yml",
    ".stylemergerc",
];

/// Key holding the configuration inside `package.json`
pub const PACKAGE_JSON_KEY: &str = "stylemerge";

/// Configuration as written in the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub plugins: PluginsSpec,
    #[serde(default)]
    pub options: RawOptions,
}

/// The plugin chain, as a list or as a name-to-options map.
///
/// In the map form `false` disables a plugin and `true` enables it with
/// default options. Both forms keep declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginsSpec {
    List(Vec<PluginEntry>),
    Map(IndexMap<String, serde_json::Value>),
}

impl Default for PluginsSpec {
    fn default() -> Self {
        PluginsSpec::List(Vec::new())
    }
}

/// One item of the list form: a bare name or `{ name: options }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Name(String),
    WithOptions(IndexMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOptions {
    /// Parser override, by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    /// Packages whose stylesheets skip the plugin chain
    #[serde(default, alias = "excludedPackages")]
    pub excluded_packages: Vec<String>,
}

impl PluginsSpec {
    /// Enabled plugins with their options, in order
    pub fn enabled(&self) -> Vec<(String, serde_json::Value)> {
        let mut enabled = Vec::new();
        match self {
            PluginsSpec::List(entries) => {
                for entry in entries {
                    match entry {
                        PluginEntry::Name(name) => {
                            enabled.push((name.clone(), serde_json::Value::Null));
                        }
                        PluginEntry::WithOptions(map) => {
                            for (name, options) in map {
                                push_enabled(&mut enabled, name, options);
                            }
                        }
                    }
                }
            }
            PluginsSpec::Map(map) => {
                for (name, options) in map {
                    push_enabled(&mut enabled, name, options);
                }
            }
        }
        enabled
    }
}

fn push_enabled(enabled: &mut Vec<(String, serde_json::Value)>, name: &str, options: &serde_json::Value) {
    match options {
        serde_json::Value::Bool(false) => {}
        serde_json::Value::Bool(true) => enabled.push((name.to_string(), serde_json::Value::Null)),
        other => enabled.push((name.to_string(), other.clone())),
    }
}

/// Resolved configuration used by the bundler
#[derive(Clone, Default)]
pub struct BundleConfig {
    pub plugins: Vec<Arc<dyn Plugin>>,
    pub parser: ParseMode,
    pub excluded_packages: ExcludedPackages,
}

impl BundleConfig {
    /// Resolve plugin and parser names.
    ///
    /// `path` is the file the configuration came from, for error messages.
    pub fn from_raw(raw: &RawConfig, path: &Path) -> Result<Self, ConfigError> {
        let mut plugins = Vec::new();
        for (name, options) in raw.plugins.enabled() {
            match builtin(&name, &options) {
                Ok(plugin) => plugins.push(plugin),
                Err(PluginLookupError::Unknown) => {
                    return Err(ConfigError::UnknownPlugin {
                        path: path.to_path_buf(),
                        name,
                    });
                }
                Err(PluginLookupError::InvalidOptions(message)) => {
                    return Err(ConfigError::PluginOptions {
                        path: path.to_path_buf(),
                        name,
                        message,
                    });
                }
            }
        }

        let parser = match &raw.options.parser {
            None => ParseMode::default(),
            Some(name) => ParseMode::from_name(name).ok_or_else(|| ConfigError::UnknownParser {
                path: path.to_path_buf(),
                name: name.clone(),
            })?,
        };

        Ok(Self {
            plugins,
            parser,
            excluded_packages: ExcludedPackages::new(&raw.options.excluded_packages),
        })
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for BundleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleConfig")
            .field("plugins", &self.plugin_names())
            .field("parser", &self.parser)
            .field("excluded_packages", &self.excluded_packages)
            .finish()
    }
}

/// Result of looking for configuration
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedConfig {
    Found { path: PathBuf, config: RawConfig },
    NotFound,
}

/// Finds and parses configuration
pub trait ConfigLoader {
    /// # Errors
    ///
    /// Returns an error when a configuration file exists but cannot be read
    /// or parsed. A missing file is [`LoadedConfig::NotFound`].
    fn load(&self) -> Result<LoadedConfig, ConfigError>;
}

/// Loads configuration from a directory on disk
#[derive(Debug, Clone)]
pub struct FsConfigLoader {
    dir: PathBuf,
}

impl FsConfigLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(path: &Path) -> Result<String, ConfigError> {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ConfigLoader for FsConfigLoader {
    fn load(&self) -> Result<LoadedConfig, ConfigError> {
        for name in CONFIG_FILES {
            let path = self.dir.join(name);
            if !path.is_file() {
                continue;
            }
            let content = Self::read(&path)?;
            let config = parse_config(&path, &content)?;
            return Ok(LoadedConfig::Found { path, config });
        }

        let package_json = self.dir.join("package.json");
        if package_json.is_file() {
            let content = Self::read(&package_json)?;
            let value: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: package_json.clone(),
                    message: e.to_string(),
                })?;
            if let Some(section) = value.get(PACKAGE_JSON_KEY) {
                let config = RawConfig::deserialize(section).map_err(|e| ConfigError::Parse {
                    path: package_json.clone(),
                    message: e.to_string(),
                })?;
                return Ok(LoadedConfig::Found {
                    path: package_json,
                    config,
                });
            }
        }

        Ok(LoadedConfig::NotFound)
    }
}

/// Supplies configuration that is already in memory
#[derive(Debug, Clone, Default)]
pub struct InlineConfigLoader {
    config: Option<RawConfig>,
}

impl InlineConfigLoader {
    /// Path reported for inline configuration
    pub const PATH: &'static str = "<inline>";

    pub fn new(config: RawConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    /// A loader that never finds configuration
    pub fn none() -> Self {
        Self::default()
    }
}

impl ConfigLoader for InlineConfigLoader {
    fn load(&self) -> Result<LoadedConfig, ConfigError> {
        Ok(match &self.config {
            Some(config) => LoadedConfig::Found {
                path: PathBuf::from(Self::PATH),
                config: config.clone(),
            },
            None => LoadedConfig::NotFound,
        })
    }
}

/// Parse configuration text, choosing the format from the file name.
///
/// `.toml` is TOML, `.json` is JSON, anything else is YAML (which also
/// accepts JSON).
pub fn parse_config(path: &Path, content: &str) -> Result<RawConfig, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        _ => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Process-wide configuration, loaded once.
///
/// The first successful load is kept for the life of the cache. A failed
/// load is not kept, so the next build tries again.
#[derive(Debug, Default)]
pub struct ConfigCache {
    cell: OnceCell<Arc<BundleConfig>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the cached configuration, loading it with `loader` if needed
    pub fn get_or_load(&self, loader: &dyn ConfigLoader) -> Result<Arc<BundleConfig>, ConfigError> {
        self.cell
            .get_or_try_init(|| match loader.load()? {
                LoadedConfig::Found { path, config } => {
                    let resolved = BundleConfig::from_raw(&config, &path)?;
                    tracing::info!(
                        path = %path.display(),
                        plugins = ?resolved.plugin_names(),
                        "Loaded stylesheet configuration"
                    );
                    Ok(Arc::new(resolved))
                }
                LoadedConfig::NotFound => {
                    tracing::debug!("No stylesheet configuration found, using defaults");
                    Ok(Arc::new(BundleConfig::default()))
                }
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn load(dir: &TempDir) -> Result<LoadedConfig, ConfigError> {
        FsConfigLoader::new(dir.path()).load()
    }

    fn found(loaded: LoadedConfig) -> RawConfig {
        match loaded {
            LoadedConfig::Found { config, .. } => config,
            LoadedConfig::NotFound => panic!("expected configuration"),
        }
    }

    #[test]
    fn test_not_found() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load(&dir).unwrap(), LoadedConfig::NotFound);
    }

    #[test]
    fn test_toml_map_form() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "stylemerge.toml",
            r#"
[plugins]
nesting = true
autoprefixer = false
strip-comments = { preserveImportant = false }

[options]
parser = "safe"
excludedPackages = ["foo:bar"]
"#,
        );

        let config = found(load(&dir).unwrap());
        let names: Vec<String> = config.plugins.enabled().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["nesting", "strip-comments"]);
        assert_eq!(config.options.parser.as_deref(), Some("safe"));
        assert_eq!(config.options.excluded_packages, vec!["foo:bar"]);

        let resolved = BundleConfig::from_raw(&config, Path::new("stylemerge.toml")).unwrap();
        assert_eq!(resolved.plugin_names(), vec!["nesting", "strip-comments"]);
        assert_eq!(resolved.parser, ParseMode::Safe);
        assert!(resolved.excluded_packages.contains("packages/foo_bar/a.css"));
    }

    #[test]
    fn test_json_list_form() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ".stylemergerc.json",
            r#"{ "plugins": ["nesting", { "strip-comments": { "preserveImportant": true } }] }"#,
        );
        let config = found(load(&dir).unwrap());
        let enabled = config.plugins.enabled();
        assert_eq!(enabled[0], ("nesting".to_string(), serde_json::Value::Null));
        assert_eq!(enabled[1].0, "strip-comments");
    }

    #[test]
    fn test_yaml_and_snake_case_option() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ".stylemergerc.yml",
            "plugins:\n  autoprefixer: {}\noptions:\n  excluded_packages: [a]\n",
        );
        let config = found(load(&dir).unwrap());
        assert_eq!(config.options.excluded_packages, vec!["a"]);
        assert_eq!(config.plugins.enabled().len(), 1);
    }

    #[test]
    fn test_search_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".stylemergerc", "plugins: [autoprefixer]");
        write(&dir, "stylemerge.toml", "plugins = [\"nesting\"]");
        let LoadedConfig::Found { path, .. } = load(&dir).unwrap() else {
            panic!("expected configuration");
        };
        assert!(path.ends_with("stylemerge.toml"));
    }

    #[test]
    fn test_package_json_key() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{ "name": "app" }"#);
        assert_eq!(load(&dir).unwrap(), LoadedConfig::NotFound);

        write(
            &dir,
            "package.json",
            r#"{ "name": "app", "stylemerge": { "plugins": ["nesting"] } }"#,
        );
        let LoadedConfig::Found { path, config } = load(&dir).unwrap() else {
            panic!("expected configuration");
        };
        assert!(path.ends_with("package.json"));
        assert_eq!(config.plugins.enabled().len(), 1);
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".stylemergerc", "  \n");
        assert_eq!(found(load(&dir).unwrap()), RawConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".stylemergerc.json", "{ plugins: ");
        assert!(matches!(load(&dir), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_plugin_and_parser() {
        let raw: RawConfig = serde_json::from_str(r#"{ "plugins": ["postcss-preset-env"] }"#).unwrap();
        let err = BundleConfig::from_raw(&raw, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPlugin { ref name, .. } if name == "postcss-preset-env"));

        let raw: RawConfig = serde_json::from_str(r#"{ "options": { "parser": "sugarss" } }"#).unwrap();
        let err = BundleConfig::from_raw(&raw, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParser { .. }));
        assert!(err.to_string().contains("sugarss"));
    }

    #[test]
    fn test_inline_loader() {
        assert_eq!(InlineConfigLoader::none().load().unwrap(), LoadedConfig::NotFound);
        let LoadedConfig::Found { path, config } = InlineConfigLoader::new(RawConfig::default()).load().unwrap() else {
            panic!("expected configuration");
        };
        assert_eq!(path, PathBuf::from("<inline>"));
        assert_eq!(config, RawConfig::default());
    }

    struct CountingLoader {
        calls: Cell<usize>,
        fail_first: bool,
    }

    impl ConfigLoader for CountingLoader {
        fn load(&self) -> Result<LoadedConfig, ConfigError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_first && self.calls.get() == 1 {
                return Err(ConfigError::Parse {
                    path: PathBuf::from("x.json"),
                    message: "bad".to_string(),
                });
            }
            Ok(LoadedConfig::NotFound)
        }
    }

    #[test]
    fn test_cache_loads_once() {
        let cache = ConfigCache::new();
        let loader = CountingLoader {
            calls: Cell::new(0),
            fail_first: false,
        };
        assert!(!cache.is_loaded());
        let first = cache.get_or_load(&loader).unwrap();
        let second = cache.get_or_load(&loader).unwrap();
        assert_eq!(loader.calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.plugins.is_empty());
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_cache_retries_after_failure() {
        let cache = ConfigCache::new();
        let loader = CountingLoader {
            calls: Cell::new(0),
            fail_first: true,
        };
        assert!(cache.get_or_load(&loader).is_err());
        assert!(!cache.is_loaded());
        assert!(cache.get_or_load(&loader).is_ok());
        assert_eq!(loader.calls.get(), 2);
    }
}

/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Config command implementation
 */

//! Config command implementation.
//!
//! Resolves the plugin configuration exactly as `bundle` would and prints
//! it as JSON, so a broken configuration can be checked without a build.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use stylemerge_core::{BundleConfig, ConfigLoader, FsConfigLoader, LoadedConfig};

/// Execute the config command
pub fn execute(dir: &Path) -> Result<()> {
    let loader = FsConfigLoader::new(dir);
    let loaded = match loader.load() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{}", err.to_diagnostic().to_text(None));
            anyhow::bail!("Failed to load configuration from {}", dir.display());
        }
    };

    let (source, raw) = match loaded {
        LoadedConfig::Found { path, config } => (Some(path), config),
        LoadedConfig::NotFound => (None, Default::default()),
    };
    let config = match BundleConfig::from_raw(&raw, source.as_deref().unwrap_or(dir)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.to_diagnostic().to_text(None));
            anyhow::bail!("Invalid configuration in {}", dir.display());
        }
    };

    let report = json!({
        "source": source.map(|p| p.display().to_string()),
        "plugins": config.plugin_names(),
        "parser": config.parser,
        "excludedPackages": raw.options.excluded_packages,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

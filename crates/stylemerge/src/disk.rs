/*
 * disk.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stylesheet inputs read from disk.
 */

//! Stylesheet inputs read from disk.
//!
//! A map written next to a stylesheet (`app.css` and `app.css.map`) is
//! picked up as the map of whatever produced that stylesheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use stylemerge_core::{FileError, InputFile, OutputStylesheet};

#[derive(Debug)]
pub struct DiskFile {
    pub path: PathBuf,
    path_in_bundle: String,
    source_url: String,
    contents: String,
    source_map: Option<String>,
    pub errors: Vec<FileError>,
    pub stylesheets: Vec<OutputStylesheet>,
}

impl DiskFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet {}", path.display()))?;

        let map_path = sibling_map_path(path);
        let source_map = if map_path.is_file() {
            Some(
                std::fs::read_to_string(&map_path)
                    .with_context(|| format!("Failed to read source map {}", map_path.display()))?,
            )
        } else {
            None
        };

        let path_in_bundle = bundle_path(path);
        Ok(Self {
            path: path.to_path_buf(),
            source_url: format!("/{}", path_in_bundle.trim_start_matches('/')),
            path_in_bundle,
            contents,
            source_map,
            errors: Vec::new(),
            stylesheets: Vec::new(),
        })
    }
}

/// `dir/app.css` -> `dir/app.css.map`
fn sibling_map_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

/// Forward-slash form of `path`, without a leading `./`
fn bundle_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.strip_prefix("./").map(str::to_string).unwrap_or(text)
}

impl InputFile for DiskFile {
    fn path_in_bundle(&self) -> &str {
        &self.path_in_bundle
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn existing_source_map(&self) -> Option<&str> {
        self.source_map.as_deref()
    }

    fn report_error(&mut self, error: FileError) {
        self.errors.push(error);
    }

    fn add_stylesheet(&mut self, stylesheet: OutputStylesheet) {
        self.stylesheets.push(stylesheet);
    }
}

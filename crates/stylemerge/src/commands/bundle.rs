/*
 * bundle.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bundle command implementation
 */

//! Bundle command implementation.
//!
//! Reads the given stylesheets, runs them through the bundler and writes
//! the result to the output directory:
//!
//! - development: `merged-stylesheets.css` plus `merged-stylesheets.css.map`
//! - production: `merged-stylesheets.min.css`, then `merged-stylesheets.min.2.css`
//!   and so on when the minifier returns more than one chunk
//!
//! File errors are printed after the bundle is written. The command fails if
//! any file had one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use stylemerge_core::{
    BuildMode, BundleError, CssBundler, DiagnosticSink, FsConfigLoader, InputFile,
    MERGED_STYLESHEET_PATH, OutputStylesheet,
};
use stylemerge_error_reporting::DiagnosticMessage;

use crate::Format;
use crate::disk::DiskFile;
use crate::minify::minify_css;

/// Arguments for the bundle command
#[derive(Debug)]
pub struct BundleArgs {
    pub files: Vec<PathBuf>,
    pub mode: BuildMode,
    pub config_dir: PathBuf,
    pub out_dir: PathBuf,
    pub format: Format,
}

/// Prints warnings to stderr as they arrive
struct ConsoleSink {
    format: Format,
}

impl DiagnosticSink for ConsoleSink {
    fn warn(&mut self, file: &str, message: DiagnosticMessage) {
        match self.format {
            Format::Text => eprintln!(
                "{}: warn: {}",
                file,
                message.problem.as_deref().unwrap_or(&message.title)
            ),
            Format::Json => eprintln!("{}", with_file(message.to_json(), file)),
        }
    }
}

fn with_file(mut value: serde_json::Value, file: &str) -> serde_json::Value {
    if let Some(object) = value.as_object_mut() {
        object.insert("file".to_string(), file.into());
    }
    value
}

/// Execute the bundle command
pub fn execute(args: BundleArgs) -> Result<()> {
    let mut files = args
        .files
        .iter()
        .map(|path| DiskFile::read(path))
        .collect::<Result<Vec<_>>>()?;

    let bundler = CssBundler::new(FsConfigLoader::new(&args.config_dir), minify_css);
    let mut sink = ConsoleSink {
        format: args.format,
    };

    let summary = match bundler.process_files_for_bundle(&mut files, args.mode, &mut sink) {
        Ok(summary) => summary,
        Err(BundleError::Config(err)) => {
            eprintln!("{}", err.to_diagnostic().to_text(None));
            anyhow::bail!("Failed to load plugin configuration");
        }
        Err(err) => return Err(err).context("Failed to minify the bundle"),
    };
    debug!(?summary, "Bundle finished");

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let written = write_outputs(&files[0].stylesheets, args.mode, &args.out_dir)?;
    for path in &written {
        info!(path = %path.display(), "Wrote stylesheet");
    }

    let mut failed = 0;
    for file in &files {
        for error in &file.errors {
            failed += 1;
            let diagnostic = error.to_diagnostic(file.path_in_bundle());
            match args.format {
                Format::Text => eprintln!("{}", diagnostic.to_text(None)),
                Format::Json => {
                    eprintln!("{}", with_file(diagnostic.to_json(), file.path_in_bundle()))
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} stylesheet error(s), see above", failed);
    }
    Ok(())
}

/// Write the bundle's artifacts and return their paths.
fn write_outputs(
    stylesheets: &[OutputStylesheet],
    mode: BuildMode,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (index, stylesheet) in stylesheets.iter().enumerate() {
        let name = match mode {
            BuildMode::Development => stylesheet
                .path
                .clone()
                .unwrap_or_else(|| MERGED_STYLESHEET_PATH.to_string()),
            BuildMode::Production => chunk_name(index),
        };
        let css_path = out_dir.join(&name);

        let mut data = stylesheet.data.clone();
        if let Some(map) = &stylesheet.source_map {
            let map_name = format!("{name}.map");
            let map_path = out_dir.join(&map_name);
            std::fs::write(&map_path, map.to_json_string())
                .with_context(|| format!("Failed to write {}", map_path.display()))?;
            data.push_str(&format!("\n/*# sourceMappingURL={map_name} */\n"));
            written.push(map_path);
        }

        std::fs::write(&css_path, data)
            .with_context(|| format!("Failed to write {}", css_path.display()))?;
        written.push(css_path);
    }

    Ok(written)
}

/// File name of the `index`th minified chunk
fn chunk_name(index: usize) -> String {
    let stem = MERGED_STYLESHEET_PATH.trim_end_matches(".css");
    match index {
        0 => format!("{stem}.min.css"),
        n => format!("{stem}.min.{}.css", n + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_names() {
        assert_eq!(chunk_name(0), "merged-stylesheets.min.css");
        assert_eq!(chunk_name(1), "merged-stylesheets.min.2.css");
        assert_eq!(chunk_name(2), "merged-stylesheets.min.3.css");
    }

    #[test]
    fn test_writes_map_next_to_development_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let stylesheet = OutputStylesheet {
            data: ".a {}".to_string(),
            source_map: Some(stylemerge_source_map::SourceMap::empty(None)),
            path: Some(MERGED_STYLESHEET_PATH.to_string()),
        };

        let written = write_outputs(&[stylesheet], BuildMode::Development, dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        let css = std::fs::read_to_string(dir.path().join(MERGED_STYLESHEET_PATH)).unwrap();
        assert_eq!(
            css,
            ".a {}\n/*# sourceMappingURL=merged-stylesheets.css.map */\n"
        );
        assert!(dir.path().join("merged-stylesheets.css.map").is_file());
    }
}

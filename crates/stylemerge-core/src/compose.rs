/*
 * compose.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source map composition for merged bundles.
 */

//! Source map composition for merged bundles.
//!
//! The merged stylesheet is stringified with a map into each file's
//! transformed text. Composition turns that into a map into each file's
//! authored source:
//!
//! 1. chain through each file's transform map (transformed text to the
//!    file's contents). Output a plugin created from nothing has no
//!    position in the contents and loses its original position,
//! 2. embed the contents of every referenced file,
//! 3. chain through each file's pre-existing map, when it came from an
//!    upstream compiler. A map that does not parse or validate is skipped
//!    for that file only.

use stylemerge_source_map::{SourceMap, SourceMapConsumer, SourceMapGenerator};

/// Everything composition needs to know about one input file
#[derive(Debug, Clone, Default)]
pub struct SourceLayer {
    /// Path in bundle, which is also the file's source name in every map
    pub path: String,
    /// Text of the file before transformation
    pub contents: String,
    /// Map from the transformed text back to `contents`
    pub transform_map: Option<SourceMap>,
    /// Map JSON supplied with the file
    pub existing_map: Option<String>,
}

/// Compose the merge map with every file's layers.
///
/// Never fails: a layer that cannot be applied is left out and the
/// mappings it would have rewritten keep pointing at the file itself.
pub fn compose_source_map(mut merge_map: SourceMapGenerator, layers: &[SourceLayer]) -> SourceMap {
    for layer in layers {
        let Some(transform_map) = &layer.transform_map else {
            continue;
        };
        match SourceMapConsumer::new(transform_map) {
            Ok(consumer) => merge_map.apply_source_map_strict(&consumer, &layer.path),
            Err(err) => {
                tracing::debug!(path = %layer.path, error = %err, "Skipping transform map")
            }
        }
    }

    let referenced = merge_map.sources();
    for layer in layers {
        if referenced.contains(&layer.path) {
            merge_map.set_source_content(layer.path.clone(), layer.contents.clone());
        }
    }

    for layer in layers {
        let Some(json) = &layer.existing_map else {
            continue;
        };
        match SourceMap::from_json(json).and_then(|map| SourceMapConsumer::new(&map)) {
            Ok(consumer) => merge_map.apply_source_map(&consumer, &layer.path),
            Err(err) => {
                tracing::debug!(path = %layer.path, error = %err, "Dropping unusable source map")
            }
        }
    }

    merge_map.to_source_map()
}

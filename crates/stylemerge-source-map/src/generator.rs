//! Collecting, composing and serializing mappings

use std::collections::HashMap;

use crate::consumer::SourceMapConsumer;
use crate::map::SourceMap;
use crate::types::{Mapping, OriginalPosition, Position};
use crate::vlq;

/// Mutable collection of mappings that serializes to a [`SourceMap`]
///
/// Mappings may be added in any order; they are sorted by generated
/// position when the map is written out.
#[derive(Debug, Clone, Default)]
pub struct SourceMapGenerator {
    file: Option<String>,
    mappings: Vec<Mapping>,
    sources_content: HashMap<String, String>,
}

impl SourceMapGenerator {
    pub fn new(file: Option<String>) -> Self {
        Self {
            file,
            mappings: Vec::new(),
            sources_content: HashMap::new(),
        }
    }

    pub fn add_mapping(&mut self, mapping: Mapping) {
        self.mappings.push(mapping);
    }

    /// Shorthand for a mapping with an original position
    pub fn add(&mut self, generated: Position, original: OriginalPosition) {
        self.mappings.push(Mapping::new(generated, Some(original)));
    }

    pub fn set_source_content(&mut self, source: impl Into<String>, content: impl Into<String>) {
        self.sources_content.insert(source.into(), content.into());
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Sources referenced by at least one mapping, in order of first use
    pub fn sources(&self) -> Vec<String> {
        let mut sorted: Vec<&Mapping> = self.mappings.iter().collect();
        sorted.sort_by_key(|m| m.generated);
        let mut sources: Vec<String> = Vec::new();
        for mapping in sorted {
            if let Some(original) = &mapping.original {
                if !sources.contains(&original.source) {
                    sources.push(original.source.clone());
                }
            }
        }
        sources
    }

    /// Remap every mapping that points into `source_name` through `consumer`
    ///
    /// `consumer` describes how `source_name` itself was generated. Mappings
    /// into `source_name` that the consumer can resolve are rewritten to
    /// point at the consumer's original; the rest are left untouched.
    /// Embedded content of the consumer's sources is carried over.
    pub fn apply_source_map(&mut self, consumer: &SourceMapConsumer, source_name: &str) {
        self.remap(consumer, source_name, false);
    }

    /// Like [`apply_source_map`](Self::apply_source_map), but mappings the
    /// consumer cannot resolve lose their original position.
    ///
    /// Use this when `source_name` positions only mean something through
    /// `consumer`, so an unresolved one would point at unrelated text.
    pub fn apply_source_map_strict(&mut self, consumer: &SourceMapConsumer, source_name: &str) {
        self.remap(consumer, source_name, true);
    }

    fn remap(&mut self, consumer: &SourceMapConsumer, source_name: &str, drop_unresolved: bool) {
        for mapping in &mut self.mappings {
            let Some(original) = &mapping.original else {
                continue;
            };
            if original.source != source_name {
                continue;
            }
            match consumer.original_position_for(original.row, original.column) {
                Some(resolved) => {
                    let name = resolved.name.or_else(|| original.name.clone());
                    mapping.original = Some(OriginalPosition { name, ..resolved });
                }
                None if drop_unresolved => mapping.original = None,
                None => {}
            }
        }

        for source in consumer.sources() {
            if let Some(content) = consumer.source_content(source) {
                self.set_source_content(source.clone(), content.to_string());
            }
        }
    }

    /// Encode into a revision 3 [`SourceMap`]
    pub fn to_source_map(&self) -> SourceMap {
        let mut sorted: Vec<&Mapping> = self.mappings.iter().collect();
        sorted.sort_by_key(|m| m.generated);

        let sources = self.sources();
        let mut names: Vec<String> = Vec::new();
        for mapping in &sorted {
            if let Some(name) = mapping.original.as_ref().and_then(|o| o.name.as_ref()) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }

        let mut encoded = String::new();
        let mut current_row = 0;
        let mut previous_column: i64 = 0;
        let mut previous_source: i64 = 0;
        let mut previous_original_row: i64 = 0;
        let mut previous_original_column: i64 = 0;
        let mut previous_name: i64 = 0;
        let mut first_in_row = true;

        for mapping in sorted {
            while current_row < mapping.generated.row {
                encoded.push(';');
                current_row += 1;
                previous_column = 0;
                first_in_row = true;
            }
            if !first_in_row {
                encoded.push(',');
            }
            first_in_row = false;

            let column = mapping.generated.column as i64;
            vlq::encode(column - previous_column, &mut encoded);
            previous_column = column;

            if let Some(original) = &mapping.original {
                let source = sources
                    .iter()
                    .position(|s| *s == original.source)
                    .unwrap_or_default() as i64;
                vlq::encode(source - previous_source, &mut encoded);
                previous_source = source;

                let row = original.row as i64;
                vlq::encode(row - previous_original_row, &mut encoded);
                previous_original_row = row;

                let column = original.column as i64;
                vlq::encode(column - previous_original_column, &mut encoded);
                previous_original_column = column;

                if let Some(name) = &original.name {
                    let index = names.iter().position(|n| n == name).unwrap_or_default() as i64;
                    vlq::encode(index - previous_name, &mut encoded);
                    previous_name = index;
                }
            }
        }

        let sources_content = if sources
            .iter()
            .any(|s| self.sources_content.contains_key(s))
        {
            Some(
                sources
                    .iter()
                    .map(|s| self.sources_content.get(s).cloned())
                    .collect(),
            )
        } else {
            None
        };

        SourceMap {
            version: 3,
            file: self.file.clone(),
            source_root: None,
            sources,
            sources_content,
            names,
            mappings: encoded,
        }
    }
}

//! Decoded, validated lookup over a source map

use crate::error::SourceMapError;
use crate::map::SourceMap;
use crate::types::{Mapping, OriginalPosition, Position};
use crate::vlq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    generated_column: usize,
    original: Option<SegmentOrigin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentOrigin {
    source: usize,
    row: usize,
    column: usize,
    name: Option<usize>,
}

/// A source map whose `mappings` have been fully decoded
///
/// Construction validates every segment, so a consumer that exists can
/// always answer lookups. This is what lets composition fail early (and
/// per map) instead of half-way through rewriting another map.
#[derive(Debug, Clone)]
pub struct SourceMapConsumer {
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    /// Segments indexed by generated row, sorted by generated column
    lines: Vec<Vec<Segment>>,
}

/// Apply a relative delta to a running field value
fn checked_add(base: usize, delta: i64, line: usize, field: &'static str) -> Result<usize, SourceMapError> {
    let value = i64::try_from(base)
        .ok()
        .and_then(|base| base.checked_add(delta))
        .ok_or(SourceMapError::Overflow { line, field })?;
    if value < 0 {
        return Err(SourceMapError::NegativeValue { line, field });
    }
    usize::try_from(value).map_err(|_| SourceMapError::Overflow { line, field })
}

impl SourceMapConsumer {
    /// Decode and validate a map
    pub fn new(map: &SourceMap) -> Result<Self, SourceMapError> {
        let sources: Vec<String> = map
            .sources
            .iter()
            .map(|source| match map.source_root.as_deref() {
                Some(root) if !root.is_empty() => {
                    format!("{}/{}", root.trim_end_matches('/'), source)
                }
                _ => source.clone(),
            })
            .collect();

        let mut sources_content = map.sources_content.clone().unwrap_or_default();
        sources_content.resize(sources.len(), None);

        let mut lines = Vec::new();
        let mut source: usize = 0;
        let mut original_row: usize = 0;
        let mut original_column: usize = 0;
        let mut name: usize = 0;

        for (line_index, line) in map.mappings.split(';').enumerate() {
            let mut segments = Vec::new();
            let mut generated_column: usize = 0;

            for raw in line.split(',').filter(|s| !s.is_empty()) {
                let fields = vlq::decode(raw)?;
                match fields.len() {
                    1 | 4 | 5 => {}
                    n => {
                        return Err(SourceMapError::BadSegment {
                            line: line_index,
                            fields: n,
                        });
                    }
                }

                generated_column =
                    checked_add(generated_column, fields[0], line_index, "generated column")?;

                let original = if fields.len() >= 4 {
                    source = checked_add(source, fields[1], line_index, "source index")?;
                    if source >= sources.len() {
                        return Err(SourceMapError::IndexOutOfRange {
                            line: line_index,
                            kind: "source",
                            index: source as i64,
                        });
                    }
                    original_row = checked_add(original_row, fields[2], line_index, "original line")?;
                    original_column =
                        checked_add(original_column, fields[3], line_index, "original column")?;

                    let segment_name = if fields.len() == 5 {
                        name = checked_add(name, fields[4], line_index, "name index")?;
                        if name >= map.names.len() {
                            return Err(SourceMapError::IndexOutOfRange {
                                line: line_index,
                                kind: "name",
                                index: name as i64,
                            });
                        }
                        Some(name)
                    } else {
                        None
                    };

                    Some(SegmentOrigin {
                        source,
                        row: original_row,
                        column: original_column,
                        name: segment_name,
                    })
                } else {
                    None
                };

                segments.push(Segment {
                    generated_column,
                    original,
                });
            }

            segments.sort_by_key(|s| s.generated_column);
            lines.push(segments);
        }

        Ok(Self {
            sources,
            sources_content,
            names: map.names.clone(),
            lines,
        })
    }

    /// Find where a generated position came from
    ///
    /// Picks the closest mapping at or before `column` on the same
    /// generated row. Returns None when there is no such mapping or the
    /// mapping has no original position.
    pub fn original_position_for(&self, row: usize, column: usize) -> Option<OriginalPosition> {
        let segments = self.lines.get(row)?;
        let index = segments.partition_point(|s| s.generated_column <= column);
        let segment = segments.get(index.checked_sub(1)?)?;
        let origin = segment.original?;
        Some(self.to_original(origin))
    }

    /// All sources referenced by the map, with `sourceRoot` applied
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Embedded content for a source, if any
    pub fn source_content(&self, source: &str) -> Option<&str> {
        let index = self.sources.iter().position(|s| s == source)?;
        self.sources_content.get(index)?.as_deref()
    }

    /// Every mapping in generated order
    pub fn mappings(&self) -> Vec<Mapping> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(row, segments)| {
                segments.iter().map(move |segment| {
                    Mapping::new(
                        Position::new(row, segment.generated_column),
                        segment.original.map(|origin| self.to_original(origin)),
                    )
                })
            })
            .collect()
    }

    fn to_original(&self, origin: SegmentOrigin) -> OriginalPosition {
        OriginalPosition {
            source: self.sources[origin.source].clone(),
            row: origin.row,
            column: origin.column,
            name: origin.name.map(|n| self.names[n].clone()),
        }
    }
}

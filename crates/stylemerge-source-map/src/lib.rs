//! Source maps for stylemerge
//!
//! This crate provides the positional plumbing behind the bundle's composed
//! source map: a line index for converting byte offsets into rows and
//! columns, a Source Map Revision 3 model with its base64 VLQ encoding, a
//! generator that collects mappings, and a consumer that answers
//! "where did this generated position come from?".
//!
//! # Overview
//!
//! The core types are:
//! - [`SourceMap`]: The serialized (JSON) form of a map
//! - [`SourceMapGenerator`]: Mutable mapping collection, including
//!   [`SourceMapGenerator::apply_source_map`] for chaining maps
//! - [`SourceMapConsumer`]: Validated, decoded lookup structure
//! - [`FileInformation`]: Line-break index for offset/location conversion
//!
//! # Example
//!
//! ```rust
//! use stylemerge_source_map::*;
//!
//! let mut generator = SourceMapGenerator::new(Some("out.css".into()));
//! generator.add_mapping(Mapping::new(
//!     Position::new(0, 0),
//!     Some(OriginalPosition::new("in.css", 2, 4)),
//! ));
//! let map = generator.to_source_map();
//!
//! let consumer = SourceMapConsumer::new(&map).unwrap();
//! let original = consumer.original_position_for(0, 0).unwrap();
//! assert_eq!(original.source, "in.css");
//! assert_eq!(original.row, 2);
//! ```

pub mod consumer;
pub mod error;
pub mod file_info;
pub mod generator;
pub mod map;
pub mod types;
pub mod vlq;

// Re-export main types
pub use consumer::SourceMapConsumer;
pub use error::SourceMapError;
pub use file_info::FileInformation;
pub use generator::SourceMapGenerator;
pub use map::SourceMap;
pub use types::{Location, Mapping, OriginalPosition, Position, Range};

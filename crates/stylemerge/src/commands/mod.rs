//! Command implementations for the stylemerge CLI
//!
//! Each command module handles the CLI interface and delegates to
//! stylemerge-core for the actual work.

pub mod bundle;
pub mod config;

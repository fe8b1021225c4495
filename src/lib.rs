//! borg-ncdu: browse what takes space in a borg archive
//!
//! Reads the flat `borg list --json-lines` listing of an archive, rebuilds
//! the directory hierarchy with aggregated apparent sizes and exports it in
//! the format `ncdu -f` imports. Sizes are the original, uncompressed sizes;
//! deduplication and compression are not accounted for.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod source;
pub mod tree;

pub use analyzer::{convert, Analysis, Analyzer, ConversionReport, ConvertOptions};
pub use export::ExportOptions;
pub use tree::RootPolicy;

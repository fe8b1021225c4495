//! Error types for the borg-ncdu conversion pipeline.

use crate::tree::node::NodeKind;
use thiserror::Error;

/// Per-record errors raised while reading the listing.
///
/// Every variant except [`RecordError::Read`] affects one line only; that
/// record is skipped and counted. A failed read leaves the rest of the
/// listing unknown and aborts the run.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: invalid JSON record: {source}")]
    InvalidJson {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: missing required field `{field}`")]
    MissingField { line: u64, field: &'static str },

    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: failed to read input: {source}")]
    Read {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

impl RecordError {
    /// 1-based input line the error refers to
    pub fn line(&self) -> u64 {
        match self {
            RecordError::InvalidJson { line, .. }
            | RecordError::MissingField { line, .. }
            | RecordError::InvalidUtf8 { line, .. }
            | RecordError::Read { line, .. } => *line,
        }
    }

    /// True when the input stream itself failed
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecordError::Read { .. })
    }
}

/// A path was asserted as both a leaf and a directory.
///
/// Attached to the affected node as a warning; the later record wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path kind conflict at {path}: was {previous:?}, now {current:?}")]
pub struct PathKindConflict {
    /// Full path of the affected node, `/`-joined
    pub path: String,
    pub previous: NodeKind,
    pub current: NodeKind,
    /// Size discarded when a leaf turned into a directory
    pub discarded_size: u64,
    /// Descendants dropped when a directory turned into a leaf
    pub discarded_descendants: usize,
}

/// Fatal tree construction errors
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("resource exhaustion: tree exceeds {limit} nodes")]
    NodeLimitExceeded { limit: usize },

    #[error("resource exhaustion: path depth {depth} exceeds limit {limit}: {path}")]
    DepthLimitExceeded {
        depth: usize,
        limit: usize,
        path: String,
    },
}

/// Export (serialization) errors. All of them indicate a defect or an
/// unwritable destination, so they are fatal.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("node {0} has no aggregate size; aggregation did not run")]
    NotAggregated(String),

    #[error("leaf node {0} has children")]
    LeafWithChildren(String),

    #[error("failed to encode document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors obtaining the listing or launching the viewer
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("input not found: {0} (expected a dump file, `-`, or REPO::ARCHIVE)")]
    NotFound(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    ExitStatus { command: String, status: String },

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error surfaced to the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Read error: {0}")]
    Read(#[from] RecordError),

    #[error("Serialization error: {0}")]
    Export(#[from] ExportError),

    #[error("Input error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

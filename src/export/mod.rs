//! ncdu export
//!
//! Turns an aggregated [`Tree`] into the nested array/object document that
//! `ncdu -f` imports. Building the document ([`export`]) is separate from
//! writing it ([`encode::write_document`]).
//!
//! Layout: `[major, minor, {metadata}, container]`, where the container is a
//! directory named `/` holding the roots selected by the [`RootPolicy`].
//! Directories are arrays `[{"name": ..}, child, ...]`; leaves are objects
//! with `asize` and `dsize`. ncdu sums directory totals itself, so directory
//! info blocks carry no sizes.

pub mod encode;

use crate::error::ExportError;
use crate::tree::builder::Tree;
use crate::tree::node::{NodeKind, TreeNode};
use crate::tree::path::{self, RootPolicy};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

pub const FORMAT_MAJOR_VERSION: u64 = 1;
pub const FORMAT_MINOR_VERSION: u64 = 2;
pub const PROGNAME: &str = env!("CARGO_PKG_NAME");
pub const PROGVER: &str = env!("CARGO_PKG_VERSION");

/// Name of the synthetic directory that holds all top-level roots
pub const CONTAINER_NAME: &str = "/";

/// Environment variable used for reproducible timestamps
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub policy: RootPolicy,
    /// Generation time in unix seconds; `None` uses the current time
    pub timestamp: Option<i64>,
}

impl ExportOptions {
    pub fn new(policy: RootPolicy) -> Self {
        Self {
            policy,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Pin the timestamp from `SOURCE_DATE_EPOCH` when it is set and valid.
    pub fn with_env_timestamp(mut self) -> Self {
        if let Some(ts) = std::env::var(SOURCE_DATE_EPOCH)
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
        {
            self.timestamp = Some(ts);
        }
        self
    }

    fn resolve_timestamp(&self) -> i64 {
        self.timestamp.unwrap_or_else(|| Utc::now().timestamp())
    }
}

/// Build the export document for an aggregated tree.
pub fn export(tree: &Tree, options: &ExportOptions) -> Result<Value, ExportError> {
    if tree.root.aggregate_size.is_none() {
        return Err(ExportError::NotAggregated(CONTAINER_NAME.to_string()));
    }

    let roots = options.policy.select_roots(&tree.root);
    debug!(root_count = roots.len(), policy = ?options.policy, "Selected top-level roots");

    let mut container = Vec::with_capacity(roots.len() + 1);
    container.push(json!({ "name": CONTAINER_NAME }));
    for &root in &roots {
        let mut prefix = vec![root.name.as_str()];
        container.push(encode_node(root, &mut prefix)?);
    }

    let metadata = json!({
        "progname": PROGNAME,
        "progver": PROGVER,
        "timestamp": options.resolve_timestamp(),
    });

    info!(roots = roots.len(), "Export document built");
    Ok(Value::Array(vec![
        Value::from(FORMAT_MAJOR_VERSION),
        Value::from(FORMAT_MINOR_VERSION),
        metadata,
        Value::Array(container),
    ]))
}

fn encode_node<'a>(node: &'a TreeNode, prefix: &mut Vec<&'a str>) -> Result<Value, ExportError> {
    let size = node
        .aggregate_size
        .ok_or_else(|| ExportError::NotAggregated(path::display_path(prefix)))?;

    if node.is_dir() {
        let mut entries = Vec::with_capacity(node.children.len() + 1);
        entries.push(json!({ "name": node.name }));
        for (name, child) in &node.children {
            prefix.push(name.as_str());
            let encoded = encode_node(child, prefix);
            prefix.pop();
            entries.push(encoded?);
        }
        return Ok(Value::Array(entries));
    }

    if !node.children.is_empty() {
        return Err(ExportError::LeafWithChildren(path::display_path(prefix)));
    }

    let mut info = Map::new();
    info.insert("name".into(), Value::from(node.name.as_str()));
    info.insert("asize".into(), Value::from(size));
    // Compression and deduplication are not modeled.
    info.insert("dsize".into(), Value::from(size));
    if let Some(mtime) = node.mtime {
        info.insert("mtime".into(), Value::from(mtime));
    }
    if matches!(node.kind, NodeKind::Symlink | NodeKind::Other) {
        info.insert("notreg".into(), Value::Bool(true));
    }
    Ok(Value::Object(info))
}

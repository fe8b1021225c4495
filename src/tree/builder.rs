//! Tree builder for turning flat records into a nested size tree

use crate::error::{PathKindConflict, TreeError};
use crate::record::EntryRecord;
use crate::tree::node::{NodeKind, TreeNode};
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use tracing::{debug, info, trace, warn};

/// Default maximum path depth accepted by the builder
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Resource limits for tree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of nodes (None = unlimited)
    #[serde(default)]
    pub max_nodes: Option<usize>,

    /// Maximum number of segments in a path
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: None,
            max_depth: default_max_depth(),
        }
    }
}

/// Counters collected while building
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Records inserted (including duplicates)
    pub records: u64,
    /// Nodes currently in the tree, synthetic root excluded
    pub nodes: usize,
    /// Exact duplicate records that changed nothing
    pub duplicates: u64,
    /// Leaf records that replaced an earlier leaf with a different size or kind
    pub replaced: u64,
    /// Leaf/directory conflicts
    pub conflicts: u64,
}

/// Complete size tree
///
/// `root` is a synthetic directory with an empty name; its children are the
/// first segments of every listed path.
#[derive(Debug, Clone)]
pub struct Tree {
    pub root: TreeNode,
    pub stats: BuildStats,
}

impl Tree {
    /// Aggregate size of the whole tree, once the aggregator has run
    pub fn total_size(&self) -> Option<u64> {
        self.root.aggregate_size
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn node_count(&self) -> usize {
        self.root.descendant_count()
    }

    /// Look up a node by its listed path
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        path::segment(path)
            .into_iter()
            .try_fold(&self.root, |node, name| node.child(name))
    }

    /// All conflicts attached to nodes, in path order
    pub fn conflicts(&self) -> Vec<&PathKindConflict> {
        fn walk<'a>(node: &'a TreeNode, out: &mut Vec<&'a PathKindConflict>) {
            out.extend(node.conflicts.iter());
            for child in node.children.values() {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }
}

/// Builds a [`Tree`] one record at a time
///
/// Records may arrive in any order; missing ancestors are created as
/// implied directories.
#[derive(Debug)]
pub struct TreeBuilder {
    root: TreeNode,
    limits: Limits,
    stats: BuildStats,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            root: TreeNode::directory(""),
            limits,
            stats: BuildStats::default(),
        }
    }

    /// Insert a parsed record. Returns `false` when the path has no
    /// segments (the `.` archive root), in which case nothing is inserted.
    pub fn insert_record(&mut self, record: &EntryRecord) -> Result<bool, TreeError> {
        let segments = path::segment(&record.path);
        if segments.is_empty() {
            trace!(line = record.line, path = %record.path, "Ignoring record without segments");
            return Ok(false);
        }
        self.insert(&segments, record.kind, record.size, record.mtime)?;
        Ok(true)
    }

    /// Insert one entry at `segments`, creating intermediate directories.
    pub fn insert(
        &mut self,
        segments: &[&str],
        kind: NodeKind,
        size: u64,
        mtime: Option<i64>,
    ) -> Result<(), TreeError> {
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };
        if segments.len() > self.limits.max_depth {
            return Err(TreeError::DepthLimitExceeded {
                depth: segments.len(),
                limit: self.limits.max_depth,
                path: path::display_path(segments),
            });
        }

        let limits = self.limits;
        let stats = &mut self.stats;
        stats.records += 1;

        let mut current = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            current = match current.children.entry(segment.to_string()) {
                Entry::Vacant(slot) => {
                    reserve_node(stats, &limits)?;
                    slot.insert(TreeNode::directory(*segment))
                }
                Entry::Occupied(slot) => {
                    let child = slot.into_mut();
                    if !child.is_dir() {
                        let path = path::display_path(&segments[..=depth]);
                        leaf_to_directory(child, path, stats);
                    }
                    child
                }
            };
        }

        match current.children.entry(last.to_string()) {
            Entry::Vacant(slot) => {
                reserve_node(stats, &limits)?;
                slot.insert(TreeNode {
                    kind,
                    own_size: size,
                    mtime,
                    explicit: true,
                    ..TreeNode::directory(*last)
                });
            }
            Entry::Occupied(slot) => {
                let node = slot.into_mut();
                let full_path = || path::display_path(segments);
                match (node.is_dir(), kind.is_leaf()) {
                    (true, false) => {
                        if node.explicit {
                            stats.duplicates += 1;
                        }
                        node.explicit = true;
                        node.own_size = size;
                        node.mtime = mtime.or(node.mtime);
                    }
                    (false, false) => {
                        leaf_to_directory(node, full_path(), stats);
                        node.explicit = true;
                        node.own_size = size;
                        node.mtime = mtime;
                    }
                    (true, true) => {
                        directory_to_leaf(node, kind, full_path(), stats);
                        node.own_size = size;
                        node.mtime = mtime;
                    }
                    (false, true) => {
                        if node.kind == kind && node.own_size == size {
                            stats.duplicates += 1;
                            trace!(path = %full_path(), "Duplicate record");
                        } else {
                            warn!(
                                path = %full_path(),
                                previous_size = node.own_size,
                                size,
                                "Record replaces an earlier entry for the same path"
                            );
                            stats.replaced += 1;
                            node.kind = kind;
                            node.own_size = size;
                        }
                        node.mtime = mtime.or(node.mtime);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn finish(self) -> Tree {
        info!(
            records = self.stats.records,
            node_count = self.stats.nodes,
            duplicates = self.stats.duplicates,
            conflicts = self.stats.conflicts,
            "Tree build completed"
        );
        Tree {
            root: self.root,
            stats: self.stats,
        }
    }
}

fn reserve_node(stats: &mut BuildStats, limits: &Limits) -> Result<(), TreeError> {
    if let Some(limit) = limits.max_nodes {
        if stats.nodes >= limit {
            return Err(TreeError::NodeLimitExceeded { limit });
        }
    }
    stats.nodes += 1;
    Ok(())
}

/// A later record needs `node` to be a directory.
fn leaf_to_directory(node: &mut TreeNode, path: String, stats: &mut BuildStats) {
    let conflict = PathKindConflict {
        path,
        previous: node.kind,
        current: NodeKind::Directory,
        discarded_size: node.own_size,
        discarded_descendants: 0,
    };
    warn!(
        path = %conflict.path,
        discarded_size = conflict.discarded_size,
        "Leaf becomes a directory"
    );
    node.kind = NodeKind::Directory;
    node.own_size = 0;
    node.mtime = None;
    node.explicit = false;
    node.conflicts.push(conflict);
    stats.conflicts += 1;
}

/// A later record asserts a leaf where a directory exists; the subtree goes.
fn directory_to_leaf(node: &mut TreeNode, kind: NodeKind, path: String, stats: &mut BuildStats) {
    let dropped = node.descendant_count();
    let conflict = PathKindConflict {
        path,
        previous: NodeKind::Directory,
        current: kind,
        discarded_size: 0,
        discarded_descendants: dropped,
    };
    warn!(path = %conflict.path, discarded_descendants = dropped, "Directory becomes a leaf");
    debug!(?kind, "Dropping subtree");
    node.children.clear();
    node.kind = kind;
    node.explicit = true;
    node.conflicts.push(conflict);
    stats.nodes -= dropped;
    stats.conflicts += 1;
}

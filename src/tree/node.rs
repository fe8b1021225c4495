//! Tree node types

use crate::error::PathKindConflict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of an archived entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl NodeKind {
    /// Map a borg `type` tag (an `ls -l` mode character) to a kind.
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "-" => NodeKind::File,
            "d" => NodeKind::Directory,
            "l" => NodeKind::Symlink,
            _ => NodeKind::Other,
        }
    }

    pub fn is_leaf(self) -> bool {
        self != NodeKind::Directory
    }
}

/// One path component in the size tree
///
/// Children are keyed by name in a `BTreeMap`, which keeps sibling names
/// unique and iteration sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    /// Size reported by the record for this entry (0 for implied directories)
    pub own_size: u64,
    /// Set by the aggregator; `None` until it has run
    pub aggregate_size: Option<u64>,
    /// Modification time in unix seconds, when the record carried one
    pub mtime: Option<i64>,
    /// True when a record named this path directly rather than implying it
    pub explicit: bool,
    pub children: BTreeMap<String, TreeNode>,
    pub conflicts: Vec<PathKindConflict>,
}

impl TreeNode {
    /// Directory implied by a deeper path
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            own_size: 0,
            aggregate_size: None,
            mtime: None,
            explicit: false,
            children: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// A directory that a record named, or that directly holds a leaf record.
    /// Directories that are only ancestors of other directories are not anchors.
    pub fn is_anchor(&self) -> bool {
        self.is_dir() && (self.explicit || self.children.values().any(|c| !c.is_dir()))
    }

    /// Number of nodes in this subtree, excluding `self`
    pub fn descendant_count(&self) -> usize {
        self.children
            .values()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Number of leaf nodes in this subtree (including `self` if it is a leaf)
    pub fn leaf_count(&self) -> usize {
        if self.is_dir() {
            self.children.values().map(TreeNode::leaf_count).sum()
        } else {
            1
        }
    }

    /// Sum of `own_size` over the leaves of this subtree
    pub fn leaf_size(&self) -> u64 {
        if self.is_dir() {
            self.children
                .values()
                .fold(0u64, |acc, c| acc.saturating_add(c.leaf_size()))
        } else {
            self.own_size
        }
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }
}

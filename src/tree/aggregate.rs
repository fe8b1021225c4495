//! Bottom-up size aggregation

use crate::tree::builder::Tree;
use crate::tree::node::TreeNode;
use std::time::Instant;
use tracing::{info, instrument};

/// Compute `aggregate_size` for every node of `tree`.
///
/// Leaves aggregate to their own size; directories to the sum of their
/// children. A directory's own size is not counted. Every value is
/// recomputed from scratch.
#[instrument(skip_all, fields(node_count = tree.stats.nodes))]
pub fn aggregate(mut tree: Tree) -> Tree {
    let start = Instant::now();
    let total = aggregate_node(&mut tree.root);
    info!(
        total_size = total,
        duration_ms = start.elapsed().as_millis(),
        "Size aggregation completed"
    );
    tree
}

fn aggregate_node(node: &mut TreeNode) -> u64 {
    let size = if node.is_dir() {
        node.children
            .values_mut()
            .map(aggregate_node)
            .fold(0u64, u64::saturating_add)
    } else {
        node.own_size
    };
    node.aggregate_size = Some(size);
    size
}

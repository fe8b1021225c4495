//! Property-based tests for conservation and order independence

use borg_ncdu::export::{self, ExportOptions};
use borg_ncdu::tree::{aggregate, NodeKind, Tree, TreeBuilder};
use borg_ncdu::RootPolicy;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Paths of 1..=4 segments from a small alphabet so prefixes collide often.
/// Leaf names carry a `.f` suffix and directory names never do, so no path
/// is ever both a leaf and a directory.
fn leaf_records() -> impl Strategy<Value = Vec<(Vec<String>, u64)>> {
    let dir = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from);
    let leaf = prop::sample::select(vec!["x", "y", "z"]).prop_map(|s| format!("{}.f", s));
    let path = (prop::collection::vec(dir, 0..4), leaf).prop_map(|(mut dirs, leaf)| {
        dirs.push(leaf);
        dirs
    });
    prop::collection::vec((path, 0u64..1_000_000), 0..40)
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn build(records: &[(Vec<String>, u64)]) -> Tree {
    let mut builder = TreeBuilder::new();
    for (path, size) in records {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        builder.insert(&segments, NodeKind::File, *size, None).unwrap();
    }
    aggregate(builder.finish())
}

/// Expected totals: the last record for each distinct path wins.
fn expected(records: &[(Vec<String>, u64)]) -> (usize, u64) {
    let mut last: BTreeMap<&Vec<String>, u64> = BTreeMap::new();
    for (path, size) in records {
        last.insert(path, *size);
    }
    (last.len(), last.values().sum())
}

fn exported_totals(doc: &serde_json::Value) -> (usize, u64) {
    match doc {
        serde_json::Value::Array(items) => items[1..]
            .iter()
            .map(exported_totals)
            .fold((0, 0), |(c, s), (c2, s2)| (c + c2, s + s2)),
        leaf => (1, leaf["asize"].as_u64().unwrap()),
    }
}

fn dedup_last(records: &[(Vec<String>, u64)]) -> Vec<(Vec<String>, u64)> {
    let mut last: BTreeMap<Vec<String>, u64> = BTreeMap::new();
    for (path, size) in records {
        last.insert(path.clone(), *size);
    }
    last.into_iter().collect()
}

proptest! {
    /// Root aggregate equals the sum of leaf sizes under both policies
    #[test]
    fn prop_size_is_conserved(records in leaf_records()) {
        let tree = build(&records);
        let (leaves, total) = expected(&records);
        prop_assert_eq!(tree.total_size(), Some(total));
        prop_assert_eq!(tree.leaf_count(), leaves);

        for policy in [RootPolicy::PerDataset, RootPolicy::Merged] {
            let doc = export::export(&tree, &ExportOptions::new(policy).with_timestamp(0)).unwrap();
            prop_assert_eq!(exported_totals(&doc[3]), (leaves, total));
        }
    }

    /// Reordering distinct records never changes the document
    #[test]
    fn prop_order_independent(records in leaf_records(), seed in any::<u64>()) {
        let unique = dedup_last(&records);
        let mut shuffled = unique.clone();
        // Deterministic permutation from the seed
        shuffled.sort_by_key(|(path, size)| {
            let mut h = seed ^ size;
            for s in path {
                for b in s.bytes() {
                    h = h.wrapping_mul(31).wrapping_add(b as u64);
                }
            }
            h
        });

        let options = ExportOptions::new(RootPolicy::PerDataset).with_timestamp(0);
        let a = export::export(&build(&unique), &options).unwrap();
        let b = export::export(&build(&shuffled), &options).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Merged policy yields one root per distinct first segment
    #[test]
    fn prop_merged_roots_match_first_segments(records in leaf_records()) {
        let tree = build(&records);
        let firsts: std::collections::BTreeSet<&String> =
            records.iter().map(|(path, _)| &path[0]).collect();
        let roots = RootPolicy::Merged.select_roots(&tree.root);
        prop_assert_eq!(roots.len(), firsts.len());
    }

    /// Every directory's aggregate is the sum of its children's
    #[test]
    fn prop_directory_sums(records in leaf_records()) {
        fn check(node: &borg_ncdu::tree::TreeNode) -> bool {
            if !node.is_dir() {
                return node.aggregate_size == Some(node.own_size);
            }
            let sum: u64 = node.children.values().filter_map(|c| c.aggregate_size).sum();
            node.aggregate_size == Some(sum) && node.children.values().all(check)
        }
        let tree = build(&records);
        prop_assert!(check(&tree.root));
    }
}

#[test]
fn test_per_dataset_roots_for_common_parent() {
    let records = vec![
        (path(&["mnt", "disk1", "code", "a.f"]), 100),
        (path(&["mnt", "disk1", "backups", "b.f"]), 50),
        (path(&["mnt", "disk2", "documents", "c.f"]), 25),
    ];
    let tree = build(&records);
    assert_eq!(RootPolicy::PerDataset.select_roots(&tree.root).len(), 3);
    assert_eq!(RootPolicy::Merged.select_roots(&tree.root).len(), 1);
}

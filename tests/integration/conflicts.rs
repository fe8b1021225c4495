//! Leaf/directory conflicts and duplicate records

use super::test_utils::{child, container, leaf_totals, listing, run, run_bytes};
use borg_ncdu::tree::NodeKind;
use borg_ncdu::{Analyzer, RootPolicy};
use std::io::Cursor;

#[test]
fn test_file_then_child_becomes_directory() {
    let input = listing(&[("/a", "-", 10), ("/a/b", "-", 5)]);

    let analysis = Analyzer::new().analyze_reader(Cursor::new(input.clone())).unwrap();
    let a = analysis.tree.find("/a").unwrap();
    assert_eq!(a.kind, NodeKind::Directory);
    assert_eq!(a.aggregate_size, Some(5));
    assert_eq!(a.child("b").unwrap().own_size, 5);

    let conflicts = analysis.tree.conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].path, "/a");
    assert_eq!(conflicts[0].discarded_size, 10);

    let (_, report) = run_bytes(&input, RootPolicy::Merged);
    assert_eq!(report.conflicts, 1);
    assert!(report.has_warnings());

    let doc = run(&input, RootPolicy::Merged);
    let a = &container(&doc)[1];
    assert!(a.is_array());
    assert_eq!(leaf_totals(a), (1, 5));
}

#[test]
fn test_leaf_after_directory_drops_subtree() {
    let input = listing(&[("x/y/z", "-", 3), ("x/y", "-", 8)]);
    let analysis = Analyzer::new().analyze_reader(Cursor::new(input)).unwrap();

    let y = analysis.tree.find("x/y").unwrap();
    assert_eq!(y.kind, NodeKind::File);
    assert_eq!(y.conflicts[0].discarded_descendants, 1);
    assert_eq!(analysis.total_size(), 8);
}

#[test]
fn test_duplicate_records_are_not_double_counted() {
    let input = listing(&[
        ("data/set/file.bin", "-", 1000),
        ("data/set/file.bin", "-", 1000),
    ]);
    let (_, report) = run_bytes(&input, RootPolicy::Merged);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.total_size, 1000);
    assert!(!report.has_warnings());

    let doc = run(&input, RootPolicy::Merged);
    let set = child(&container(&doc)[1], "set").unwrap();
    assert_eq!(child(set, "file.bin").unwrap()["asize"], 1000);
    assert_eq!(leaf_totals(&doc[3]), (1, 1000));
}

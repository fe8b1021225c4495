//! Shared helpers for integration tests
//!
//! Build listings in the `borg list --json-lines` shape and inspect
//! exported documents the way ncdu would read them.

use borg_ncdu::{convert, ConversionReport, ConvertOptions, ExportOptions, RootPolicy};
use serde_json::{json, Value};
use std::io::Cursor;

/// Fixed generation time so documents compare byte for byte
pub const TIMESTAMP: i64 = 1_700_000_000;

/// One JSON line per `(path, type tag, size)`
pub fn listing(entries: &[(&str, &str, u64)]) -> String {
    entries
        .iter()
        .map(|(path, tag, size)| {
            json!({
                "type": tag,
                "mode": "-rw-r--r--",
                "user": "root",
                "group": "root",
                "path": path,
                "size": size,
                "mtime": "2023-11-14T22:13:20.000000",
                "healthy": true,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn options(policy: RootPolicy) -> ConvertOptions {
    ConvertOptions {
        export: ExportOptions::new(policy).with_timestamp(TIMESTAMP),
        ..ConvertOptions::default()
    }
}

/// Run the whole pipeline and return the raw output bytes and report
pub fn run_bytes(input: &str, policy: RootPolicy) -> (Vec<u8>, ConversionReport) {
    let mut out = Vec::new();
    let report = convert(Cursor::new(input.to_string()), &mut out, &options(policy)).unwrap();
    (out, report)
}

/// Run the whole pipeline and parse the document
pub fn run(input: &str, policy: RootPolicy) -> Value {
    let (out, _) = run_bytes(input, policy);
    serde_json::from_slice(&out).unwrap()
}

/// The `/` container: `[{"name": "/"}, root...]`
pub fn container(doc: &Value) -> &Vec<Value> {
    doc[3].as_array().expect("container must be an array")
}

/// Names of the top-level roots
pub fn root_names(doc: &Value) -> Vec<String> {
    container(doc)[1..].iter().map(|n| entry_name(n).to_string()).collect()
}

pub fn entry_name(node: &Value) -> &str {
    match node {
        Value::Array(items) => items[0]["name"].as_str().unwrap(),
        other => other["name"].as_str().unwrap(),
    }
}

/// `(leaf count, total apparent size)` as ncdu would sum it
pub fn leaf_totals(node: &Value) -> (usize, u64) {
    match node {
        Value::Array(items) => items[1..]
            .iter()
            .map(leaf_totals)
            .fold((0, 0), |(c, s), (c2, s2)| (c + c2, s + s2)),
        other => (1, other["asize"].as_u64().unwrap()),
    }
}

/// Find a child entry of a directory array by name
pub fn child<'a>(dir: &'a Value, name: &str) -> Option<&'a Value> {
    dir.as_array()?[1..].iter().find(|n| entry_name(n) == name)
}

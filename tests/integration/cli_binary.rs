//! Runs the compiled binary against dump files and stdin.

use super::test_utils::listing;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_borg-ncdu"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env("HOME", temp_dir.path())
        .env("SOURCE_DATE_EPOCH", "42")
        .env_remove("BORG_NCDU_LOG")
        .arg("--quiet");
    cmd
}

fn write_dump(temp_dir: &TempDir) -> std::path::PathBuf {
    let dump = temp_dir.path().join("archive.jsonl");
    fs::write(
        &dump,
        listing(&[
            ("mnt/disk1/code", "d", 0),
            ("mnt/disk1/code/a.txt", "-", 100),
            ("mnt/disk2/documents", "d", 0),
            ("mnt/disk2/documents/c.txt", "-", 25),
        ]),
    )
    .unwrap();
    dump
}

#[test]
fn test_dump_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(&temp_dir);

    let output = command(&temp_dir).arg(&dump).output().unwrap();
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc[2]["timestamp"], 42);
    assert_eq!(doc[3][1][0]["name"], "code");
    assert_eq!(doc[3][2][0]["name"], "documents");
}

#[test]
fn test_full_path_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(&temp_dir);
    let out = temp_dir.path().join("out.json");

    let status = command(&temp_dir)
        .arg("--full-path")
        .arg("-o")
        .arg(&out)
        .arg(&dump)
        .status()
        .unwrap();
    assert!(status.success());

    let doc: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(doc[3].as_array().unwrap().len(), 2);
    assert_eq!(doc[3][1][0]["name"], "mnt");
}

#[test]
fn test_stdin_input() {
    let temp_dir = TempDir::new().unwrap();
    let mut child = command(&temp_dir)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(listing(&[("x", "-", 3)]).as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc[3][1]["name"], "x");
    assert_eq!(doc[3][1]["asize"], 3);
}

#[test]
fn test_skipped_records_reported_on_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let dump = temp_dir.path().join("broken.jsonl");
    fs::write(&dump, format!("{}\nnot json\n", listing(&[("x", "-", 3)]))).unwrap();

    let output = command(&temp_dir).arg(&dump).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 malformed records skipped"), "stderr={}", stderr);
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = command(&temp_dir)
        .arg(temp_dir.path().join("missing.jsonl"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input not found"));
}

#[test]
fn test_node_limit_from_environment_aborts_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(&temp_dir);
    let output = command(&temp_dir)
        .env("BORG_NCDU__LIMITS__MAX_NODES", "2")
        .arg(&dump)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("resource exhaustion"));
}

#[test]
fn test_print_config_reflects_environment() {
    let temp_dir = TempDir::new().unwrap();
    let output = command(&temp_dir)
        .env("BORG_NCDU__MERGE_DATASETS", "true")
        .arg("--print-config")
        .output()
        .unwrap();
    assert!(output.status.success());
    let printed: toml::Value = toml::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(printed["merge_datasets"].as_bool(), Some(true));
    assert_eq!(printed["borg_command"].as_str(), Some("borg"));
}

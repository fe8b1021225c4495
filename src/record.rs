//! Record stream reader for `borg list --json-lines` output
//!
//! Each input line becomes one [`EntryRecord`]. Malformed lines produce a
//! [`RecordError`] for that line only and the stream keeps going. A failed
//! read ends the stream with [`RecordError::Read`].

use crate::error::RecordError;
use crate::tree::node::NodeKind;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::io::{BufRead, ErrorKind, Lines};
use tracing::{debug, warn};

/// Number of record errors kept verbatim in a [`ReadSummary`]
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Line shape as borg emits it. Every field is optional here so that
/// missing fields become [`RecordError::MissingField`] instead of a
/// generic JSON error.
#[derive(Debug, Deserialize)]
struct RawRecord {
    path: Option<String>,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    size: Option<u64>,
    mtime: Option<String>,
}

/// One archived entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRecord {
    /// 1-based input line
    pub line: u64,
    /// Path exactly as listed (borg lists paths without a leading `/`)
    pub path: String,
    pub kind: NodeKind,
    /// Apparent size in bytes
    pub size: u64,
    /// Modification time in unix seconds
    pub mtime: Option<i64>,
}

impl EntryRecord {
    /// Parse a single line.
    ///
    /// `size` is required for regular files and defaults to 0 for every
    /// other kind; borg reports 0 for directories anyway.
    pub fn parse(line_no: u64, line: &str) -> Result<Self, RecordError> {
        let raw: RawRecord =
            serde_json::from_str(line).map_err(|source| RecordError::InvalidJson {
                line: line_no,
                source,
            })?;

        let path = raw.path.ok_or(RecordError::MissingField {
            line: line_no,
            field: "path",
        })?;
        let type_tag = raw.type_tag.ok_or(RecordError::MissingField {
            line: line_no,
            field: "type",
        })?;
        let kind = NodeKind::from_type_tag(&type_tag);

        let size = match (raw.size, kind) {
            (Some(size), _) => size,
            (None, NodeKind::File) => {
                return Err(RecordError::MissingField {
                    line: line_no,
                    field: "size",
                })
            }
            (None, _) => 0,
        };

        let mtime = raw.mtime.as_deref().and_then(|s| {
            let parsed = parse_mtime(s);
            if parsed.is_none() {
                debug!(line = line_no, mtime = s, "Ignoring unparseable mtime");
            }
            parsed
        });

        Ok(Self {
            line: line_no,
            path,
            kind,
            size,
            mtime,
        })
    }
}

/// Parse borg's ISO-8601 timestamps into unix seconds.
///
/// borg 1.x prints local naive times (`2021-03-04T05:06:07.000000`), newer
/// versions include an offset. Naive times are taken as UTC.
pub fn parse_mtime(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Lazy, one-pass reader over line-delimited records
pub struct RecordReader<R> {
    lines: Lines<R>,
    line_no: u64,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            done: false,
        }
    }

    /// Lines consumed so far, blank ones included
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<EntryRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(EntryRecord::parse(self.line_no, &line)),
                // Invalid UTF-8 consumes the line; the stream is still usable.
                Err(source) if source.kind() == ErrorKind::InvalidData => {
                    return Some(Err(RecordError::InvalidUtf8 {
                        line: self.line_no,
                        source,
                    }));
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(RecordError::Read {
                        line: self.line_no,
                        source,
                    }));
                }
            }
        }
    }
}

/// Counters for one pass over the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSummary {
    /// Records accepted into the tree
    pub records: u64,
    /// Records that carry no path segments (e.g. the `.` archive root)
    pub ignored: u64,
    /// Malformed records that were skipped
    pub skipped: u64,
    /// First few skip reasons, for reporting
    pub errors: Vec<String>,
}

impl ReadSummary {
    pub fn record_error(&mut self, err: &RecordError) {
        warn!(line = err.line(), error = %err, "Skipping malformed record");
        self.skipped += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(err.to_string());
        }
    }
}

//! Conversion pipeline
//!
//! Reader → segmenter → builder → aggregator run here; the exporter runs on
//! the finished [`Analysis`]. Nothing is written until every stage succeeded.

use crate::error::{ApiError, ExportError, RecordError};
use crate::export::{self, encode, ExportOptions};
use crate::record::{EntryRecord, ReadSummary, RecordReader};
use crate::tree::{aggregate, Limits, Tree, TreeBuilder};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{info, instrument};

/// Default number of records between progress events
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Builds aggregated trees from record streams
#[derive(Debug, Clone)]
pub struct Analyzer {
    limits: Limits,
    progress_interval: u64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Emit a progress event every `interval` records (0 disables)
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Consume a record stream and return the aggregated tree.
    ///
    /// Malformed records are counted in the summary and skipped. A failed
    /// read or an exceeded resource limit aborts the run.
    #[instrument(skip_all)]
    pub fn analyze<I>(&self, records: I) -> Result<Analysis, ApiError>
    where
        I: IntoIterator<Item = Result<EntryRecord, RecordError>>,
    {
        let start = Instant::now();
        let mut builder = TreeBuilder::with_limits(self.limits);
        let mut summary = ReadSummary::default();

        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    summary.record_error(&err);
                    continue;
                }
            };
            if builder.insert_record(&record)? {
                summary.records += 1;
                if self.progress_interval > 0 && summary.records % self.progress_interval == 0 {
                    info!(records = summary.records, "Processing records");
                }
            } else {
                summary.ignored += 1;
            }
        }

        let tree = aggregate(builder.finish());
        info!(
            records = summary.records,
            ignored = summary.ignored,
            skipped = summary.skipped,
            duration_ms = start.elapsed().as_millis(),
            "Listing processed"
        );
        Ok(Analysis { tree, summary })
    }

    /// Read line-delimited records from `reader` and analyze them.
    pub fn analyze_reader<R: BufRead>(&self, reader: R) -> Result<Analysis, ApiError> {
        self.analyze(RecordReader::new(reader))
    }
}

/// Result of one analysis run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Aggregated tree
    pub tree: Tree,
    pub summary: ReadSummary,
}

impl Analysis {
    pub fn total_size(&self) -> u64 {
        self.tree.total_size().unwrap_or(0)
    }

    pub fn to_document(&self, options: &ExportOptions) -> Result<Value, ExportError> {
        export::export(&self.tree, options)
    }

    pub fn report(&self, options: &ExportOptions) -> ConversionReport {
        ConversionReport {
            records: self.summary.records,
            ignored: self.summary.ignored,
            skipped: self.summary.skipped,
            errors: self.summary.errors.clone(),
            conflicts: self.tree.stats.conflicts,
            duplicates: self.tree.stats.duplicates,
            roots: options.policy.select_roots(&self.tree.root).len(),
            total_size: self.total_size(),
        }
    }
}

/// Options for a complete conversion run
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub export: ExportOptions,
    pub limits: Limits,
    pub pretty: bool,
    pub progress_interval: Option<u64>,
}

/// What a conversion did, for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub records: u64,
    pub ignored: u64,
    pub skipped: u64,
    pub errors: Vec<String>,
    pub conflicts: u64,
    pub duplicates: u64,
    pub roots: usize,
    pub total_size: u64,
}

impl ConversionReport {
    /// True when something in the input deserves the operator's attention
    pub fn has_warnings(&self) -> bool {
        self.skipped > 0 || self.conflicts > 0
    }
}

/// Read a listing from `reader` and write the ncdu document to `writer`.
pub fn convert<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConversionReport, ApiError> {
    let analyzer = Analyzer::new()
        .with_limits(options.limits)
        .with_progress_interval(options.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL));
    let analysis = analyzer.analyze_reader(reader)?;
    let document = analysis.to_document(&options.export)?;
    encode::write_document(writer, &document, options.pretty)?;
    Ok(analysis.report(&options.export))
}

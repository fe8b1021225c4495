//! CLI output: error mapping and the end-of-run report.

use crate::analyzer::ConversionReport;
use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    format!("borg-ncdu: {}", e)
}

/// Human readable size with binary units
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Summary printed to stderr after a run with warnings.
pub fn format_report(report: &ConversionReport) -> String {
    let mut out = format!(
        "{} records, {} roots, {} total",
        report.records,
        report.roots,
        format_size(report.total_size)
    );
    if report.skipped > 0 {
        out.push_str(&format!("\n{} malformed records skipped:", report.skipped));
        for err in &report.errors {
            out.push_str("\n  ");
            out.push_str(err);
        }
        if report.skipped as usize > report.errors.len() {
            out.push_str("\n  ...");
        }
    }
    if report.conflicts > 0 {
        out.push_str(&format!(
            "\n{} paths listed as both file and directory; later records won",
            report.conflicts
        ));
    }
    out
}

//! CLI parse: clap types for borg-ncdu. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// borg-ncdu - browse the apparent size of a borg archive in ncdu
#[derive(Parser, Debug)]
#[command(name = "borg-ncdu", version)]
#[command(about = "Convert a borg archive listing into an ncdu export")]
pub struct Cli {
    /// REPO::ARCHIVE to list with borg, a `borg list --json-lines` dump, or `-` for stdin
    #[arg(required_unless_present = "print_config")]
    pub source: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Keep all datasets nested under their shared path prefix
    #[arg(long)]
    pub full_path: bool,

    /// Write the export to FILE instead of stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "open")]
    pub output: Option<PathBuf>,

    /// Open the export in ncdu instead of writing it out
    #[arg(long)]
    pub open: bool,

    /// Pretty-print the exported JSON
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

//! borg-ncdu CLI Binary
//!
//! Converts a borg archive listing into an ncdu export.

use borg_ncdu::cli::{format_report, map_error, Cli, RunContext};
use borg_ncdu::config::{BorgNcduConfig, ConfigLoader};
use borg_ncdu::logging::{init_logging, resolve_log_file_path, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if cli.print_config {
        match config.to_toml() {
            Ok(text) => {
                print!("{}", text);
                return;
            }
            Err(e) => {
                eprintln!("{}", map_error(&e));
                process::exit(1);
            }
        }
    }

    // Initialize logging early
    let logging_config = build_logging_config(&cli, &config);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("borg-ncdu starting");

    let context = RunContext::from_config(config);
    match context.execute(&cli) {
        Ok(report) => {
            info!(
                records = report.records,
                roots = report.roots,
                total_size = report.total_size,
                "Conversion completed"
            );
            if report.has_warnings() {
                eprintln!("{}", format_report(&report));
            }
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and the loaded config.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, config: &BorgNcduConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.quiet {
        logging.enabled = false;
    }
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }

    if logging.output.contains("file") {
        if let Ok(path) = resolve_log_file_path(cli.log_file.clone(), logging.file.clone()) {
            logging.file = Some(path);
        }
    } else if let Some(ref file) = cli.log_file {
        logging.file = Some(file.clone());
    }

    logging
}

//! CLI route: run context. Wires config, source, pipeline and destination.

use crate::analyzer::{Analyzer, ConversionReport};
use crate::cli::parse::Cli;
use crate::config::BorgNcduConfig;
use crate::error::ApiError;
use crate::export::{encode, ExportOptions};
use crate::source::{self, InputSource};
use crate::tree::RootPolicy;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Where the document goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
    Ncdu,
}

/// Runtime context for one CLI invocation
pub struct RunContext {
    config: BorgNcduConfig,
}

impl RunContext {
    pub fn from_config(config: BorgNcduConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BorgNcduConfig {
        &self.config
    }

    /// Effective export options: CLI flag over config, timestamp from
    /// `SOURCE_DATE_EPOCH` when set.
    pub fn export_options(&self, cli: &Cli) -> ExportOptions {
        let policy = if cli.full_path {
            RootPolicy::Merged
        } else {
            self.config.root_policy()
        };
        ExportOptions::new(policy).with_env_timestamp()
    }

    pub fn destination(cli: &Cli) -> Destination {
        if cli.open {
            Destination::Ncdu
        } else if let Some(path) = &cli.output {
            Destination::File(path.clone())
        } else {
            Destination::Stdout
        }
    }

    /// Run the conversion described by `cli`.
    #[instrument(skip_all, fields(source = ?cli.source))]
    pub fn execute(&self, cli: &Cli) -> Result<ConversionReport, ApiError> {
        let source = cli
            .source
            .as_deref()
            .ok_or_else(|| ApiError::ConfigError("No input source given".to_string()))?;
        let input = InputSource::detect(source)?;
        let options = self.export_options(cli);
        let pretty = cli.pretty || self.config.pretty;

        let analyzer = Analyzer::new()
            .with_limits(self.config.limits)
            .with_progress_interval(self.config.progress_interval);

        let mut listing = input.open(&self.config.borg_command)?;
        let analysis = analyzer.analyze_reader(&mut listing)?;
        // A failed borg run means the listing may be incomplete.
        listing.finish()?;

        info!("Generating ncdu tree");
        let document = analysis.to_document(&options)?;

        match Self::destination(cli) {
            Destination::Stdout => {
                let stdout = std::io::stdout();
                encode::write_document(stdout.lock(), &document, pretty)?;
            }
            Destination::File(path) => {
                let file = File::create(&path)?;
                encode::write_document(file, &document, pretty)?;
                info!(path = %path.display(), "Export written");
            }
            Destination::Ncdu => {
                let mut temp = tempfile::Builder::new()
                    .prefix("borg-ncdu-")
                    .suffix(".json")
                    .tempfile()?;
                encode::write_document(temp.as_file_mut(), &document, pretty)?;
                temp.as_file_mut().flush()?;
                source::open_in_ncdu(&self.config.ncdu_command, temp.path())?;
            }
        }

        Ok(analysis.report(&options))
    }
}

//! `lectio ingest` — run one source catalog through the driver

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use lectio_core::SharedProgress;
use lectio_ingest::config::SourceConfig;
use lectio_ingest::{DriverOptions, driver};

use crate::config::Config;

#[derive(Args)]
pub struct IngestArgs {
    /// Source catalog TOML (ordered work-unit list)
    #[arg(long)]
    pub source: PathBuf,

    /// Output directory (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Max units to process (for testing)
    #[arg(long)]
    pub max_units: Option<usize>,
}

pub fn run(args: IngestArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    // a malformed catalog aborts before any unit runs
    let source = SourceConfig::load(&args.source)?;

    let opts = DriverOptions {
        output_dir: args
            .output_dir
            .unwrap_or_else(|| config.output.default_dir.clone()),
        fetch: config.fetch_options(),
        request_interval: config.request_interval(),
        max_units: args.max_units,
    };

    let summary = driver::run(&source, &opts, progress)?;
    if progress.is_tty() {
        summary.print();
    } else {
        summary.log();
    }

    if summary.interrupted {
        return Ok(ExitCode::from(130));
    }
    if summary.failed > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

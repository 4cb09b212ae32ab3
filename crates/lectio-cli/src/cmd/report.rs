//! `lectio report` — rebuild the derived progress report from disk

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use lectio_core::{SharedProgress, fmt_num};
use lectio_ingest::config::SourceConfig;
use lectio_ingest::report;

use crate::config::Config;

#[derive(Args)]
pub struct ReportArgs {
    /// Source catalog TOML the run was ingested from
    #[arg(long)]
    pub source: PathBuf,

    /// Output directory (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: ReportArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let source = SourceConfig::load(&args.source)?;
    let root = args
        .output_dir
        .unwrap_or_else(|| config.output.default_dir.clone());
    let source_dir = root.join(&source.name);

    let snapshot = report::recompute(&source, &source_dir)?;
    snapshot.save(&source_dir)?;

    let total_chunks: usize = snapshot.chunk_counts.values().sum();
    progress.println(format!(
        "{}: {}/{} units complete ({:.1}%), {} chunks on disk",
        snapshot.source,
        snapshot.completed_units,
        snapshot.total_units,
        snapshot.percent_complete,
        fmt_num(total_chunks)
    ));
    Ok(ExitCode::SUCCESS)
}

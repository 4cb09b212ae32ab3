//! lectio - Corpus ingestion pipeline for classical and sacred texts
//!
//! Fetches scripture translations, classical works, patristic writings and
//! other textual corpora from remote sources, chunks them into bounded
//! passages, and keeps every run crash-resumable.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "lectio")]
#[command(about = "Fetch and chunk textual corpora from remote sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./lectio.toml or ~/.config/lectio/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Minimum milliseconds between requests
    #[arg(long, global = true)]
    interval_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a source catalog: fetch, chunk, checkpoint
    Ingest(cmd::ingest::IngestArgs),
    /// Merge author and work identities across ingested sources
    Merge(cmd::merge::MergeArgs),
    /// Recompute the derived progress report for a source
    Report(cmd::report::ReportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    lectio_core::install_signal_handlers()?;

    // Progress context (TTY auto-detect)
    let progress = Arc::new(lectio_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    lectio_core::init_logging(quiet, cli.debug, multi);

    // Load configuration (file defaults, CLI overrides)
    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if let Some(timeout) = cli.timeout {
        config.http.timeout = timeout;
    }
    if let Some(max_retries) = cli.max_retries {
        config.http.max_retries = max_retries;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.http.interval_ms = interval_ms;
    }

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, &config, &progress),
        Command::Merge(args) => cmd::merge::run(args, &config, &progress),
        Command::Report(args) => cmd::report::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["Request timeout", &format!("{}s", config.http.timeout)]);
            table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
            table.add_row(vec![
                "Backoff base",
                &format!("{}ms", config.http.base_delay_ms),
            ]);
            table.add_row(vec![
                "Request interval",
                &format!("{}ms", config.http.interval_ms),
            ]);

            eprintln!("\n{table}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

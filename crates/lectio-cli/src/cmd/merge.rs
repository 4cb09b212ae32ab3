//! `lectio merge` — cross-source identity merge over an output tree

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use lectio_core::SharedProgress;
use lectio_merge::merge_tree;

use crate::config::Config;

#[derive(Args)]
pub struct MergeArgs {
    /// Output tree to merge (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: MergeArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let root = args
        .output_dir
        .unwrap_or_else(|| config.output.default_dir.clone());

    let report = merge_tree(&root)?;

    if progress.is_tty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Identity merge")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);
        table.add_row(vec!["Sources", &report.sources.to_string()]);
        table.add_row(vec![
            "Authors",
            &format!("{} -> {}", report.authors_before, report.authors_after),
        ]);
        table.add_row(vec![
            "Works",
            &format!("{} -> {}", report.works_before, report.works_after),
        ]);
        table.add_row(vec!["Chunk files", &report.chunk_files.to_string()]);
        table.add_row(vec!["Chunks remapped", &report.chunks_remapped.to_string()]);
        eprintln!("\n{table}");
    }
    // merge_tree already logged the same numbers for non-TTY runs

    Ok(ExitCode::SUCCESS)
}

//! Run statistics and summary reporting.
//!
//! TTY runs print a comfy-table at the end; non-TTY runs log the same
//! numbers line by line. Failures are never silent either way.

use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use lectio_core::fmt_num;

/// Per-unit statistics, collected as each work unit completes.
#[derive(Debug, Clone)]
pub struct UnitStats {
    pub key: String,
    pub sections: usize,
    pub chunks: usize,
    pub bytes_fetched: usize,
    pub elapsed: Duration,
}

impl UnitStats {
    /// Log unit completion (non-TTY mode only).
    pub fn log(&self) {
        log::info!(
            "{}: {} sections -> {} chunks ({} bytes) [{:.1}s]",
            self.key,
            fmt_num(self.sections),
            fmt_num(self.chunks),
            fmt_num(self.bytes_fetched),
            self.elapsed.as_secs_f64()
        );
    }
}

/// Aggregated statistics for one source's run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub source: String,
    pub total_units: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub not_found: usize,
    pub chunks_written: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
    pub units: Vec<UnitStats>,
}

impl RunSummary {
    pub fn new(source: &str, total_units: usize) -> Self {
        Self {
            source: source.to_string(),
            total_units,
            ..Self::default()
        }
    }

    pub fn record_completed(&mut self, stats: UnitStats) {
        self.completed += 1;
        self.chunks_written += stats.chunks;
        self.units.push(stats);
    }

    /// Units that terminated this run without completing.
    pub fn unsuccessful(&self) -> usize {
        self.failed + self.not_found
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new(format!("Ingestion: {}", self.source))
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Units"),
            Cell::new(format!(
                "{}/{} completed",
                self.completed, self.total_units
            )),
        ]);
        table.add_row(vec![
            Cell::new("Skipped (checkpointed)"),
            Cell::new(fmt_num(self.skipped)),
        ]);
        let failed_cell = Cell::new(fmt_num(self.failed));
        table.add_row(vec![
            Cell::new("Failed"),
            if self.failed > 0 {
                failed_cell.fg(Color::Red)
            } else {
                failed_cell
            },
        ]);
        table.add_row(vec![
            Cell::new("Not found"),
            Cell::new(fmt_num(self.not_found)),
        ]);
        table.add_row(vec![
            Cell::new("Chunks written"),
            Cell::new(fmt_num(self.chunks_written)),
        ]);
        table.add_row(vec![
            Cell::new("Time"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);
        if self.interrupted {
            table.add_row(vec![
                Cell::new("Interrupted").fg(Color::Yellow),
                Cell::new("resume with the same command"),
            ]);
        }
        table.to_string()
    }

    /// Print table to stderr (TTY mode).
    pub fn print(&self) {
        eprintln!("\n{}", self.format_table());
    }

    /// Log summary lines (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "{}: {}/{} units completed, {} skipped, {} failed, {} not found, {} chunks [{:.1}s]",
            self.source,
            self.completed,
            self.total_units,
            self.skipped,
            self.failed,
            self.not_found,
            fmt_num(self.chunks_written),
            self.elapsed.as_secs_f64()
        );
        if self.interrupted {
            log::warn!("{}: interrupted before completion", self.source);
        }
    }
}

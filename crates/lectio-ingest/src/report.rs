//! Derived progress report.
//!
//! `progress.json` is regenerated after every completed unit so an
//! operator can watch a long run from outside the process. It is derived,
//! never authoritative: `recompute` rebuilds it from the checkpoint and
//! the chunk files alone, which is also what `lectio report` does.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lectio_core::{Checkpoint, write_json_atomic};
use serde::{Deserialize, Serialize};

use crate::config::Source;

pub const REPORT_FILE: &str = "progress.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressReport {
    pub source: String,
    pub total_units: usize,
    pub completed_units: usize,
    pub percent_complete: f64,
    /// Completed unit key -> chunks on disk for that unit.
    pub chunk_counts: BTreeMap<String, usize>,
    /// Units that failed in the most recent run (empty when recomputed
    /// from disk: failures leave no records).
    pub failed_units: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ProgressReport {
    pub fn save(&self, source_dir: &Path) -> Result<()> {
        write_json_atomic(&source_dir.join(REPORT_FILE), self)
            .context("failed to write progress report")
    }
}

/// Build a report from the checkpoint plus per-unit chunk counts gathered
/// during the run.
pub fn build(
    source: &Source,
    checkpoint: &Checkpoint,
    chunk_counts: &BTreeMap<String, usize>,
    failed_units: &[String],
) -> ProgressReport {
    let total = source.works.len();
    let completed = source
        .works
        .iter()
        .filter(|w| checkpoint.is_done(&w.key))
        .count();
    ProgressReport {
        source: source.name.clone(),
        total_units: total,
        completed_units: completed,
        percent_complete: percent(completed, total),
        chunk_counts: chunk_counts.clone(),
        failed_units: failed_units.to_vec(),
        generated_at: Utc::now(),
    }
}

/// Rebuild the report purely from disk state: the checkpoint file and the
/// line counts of each unit's chunk file.
pub fn recompute(source: &Source, source_dir: &Path) -> Result<ProgressReport> {
    let checkpoint = Checkpoint::load(source_dir.join("checkpoint.json"))?;
    let chunks_dir = source_dir.join("chunks");

    let mut chunk_counts = BTreeMap::new();
    for work in &source.works {
        if !checkpoint.is_done(&work.key) {
            continue;
        }
        let path = chunks_dir.join(chunk_filename(&work.key));
        let count = match fs::read_to_string(&path) {
            Ok(content) => content.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(_) => {
                log::warn!("{}: checkpointed but chunk file missing", work.key);
                0
            }
        };
        chunk_counts.insert(work.key.clone(), count);
    }

    Ok(build(source, &checkpoint, &chunk_counts, &[]))
}

/// Mirror of the sink's filename mangling for a unit key.
fn chunk_filename(unit_key: &str) -> String {
    let safe: String = unit_key
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}.jsonl")
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

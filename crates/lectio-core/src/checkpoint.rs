//! Durable record of completed work units.
//!
//! The driver marks a unit done only after its records are on disk, and the
//! file is rewritten whole via write-then-rename on every mark, so a crash
//! loses at most the unit that was in flight. Loaded once at startup;
//! membership checks afterwards are in-memory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::records::write_json_atomic;

/// On-disk shape: `{completed: [key], last_updated: ISO8601}`.
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    completed: Vec<String>,
    last_updated: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    completed: FxHashSet<String>,
}

impl Checkpoint {
    /// Load the checkpoint at `path`, or start empty if none exists yet.
    ///
    /// A present-but-unparsable file is an error, not an empty start:
    /// silently discarding it would re-ingest the whole corpus.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let completed = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file: CheckpointFile = serde_json::from_str(&json)
                .with_context(|| format!("corrupt checkpoint {}", path.display()))?;
            file.completed.into_iter().collect()
        } else {
            FxHashSet::default()
        };
        Ok(Self { path, completed })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_done(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Completed keys in sorted order (the on-disk order).
    pub fn completed(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.completed.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Record `key` as completed and persist immediately.
    ///
    /// Call only after the unit's records are durably written. Marking an
    /// already-done key is a no-op and does not rewrite the file.
    pub fn mark_done(&mut self, key: &str) -> Result<()> {
        if !self.completed.insert(key.to_string()) {
            return Ok(());
        }
        self.save()
    }

    /// Rewrite the durable record atomically.
    pub fn save(&self) -> Result<()> {
        let mut completed: Vec<String> = self.completed.iter().cloned().collect();
        completed.sort_unstable();
        let file = CheckpointFile {
            completed,
            last_updated: Utc::now(),
        };
        write_json_atomic(&self.path, &file)
            .with_context(|| format!("failed to save checkpoint {}", self.path.display()))
    }
}

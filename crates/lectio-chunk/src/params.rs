//! Passage length windows

use serde::{Deserialize, Serialize};

/// Length window for emitted passages, in characters.
///
/// `overlap` is the approximate character budget of the lexical bridge
/// carried between adjacent chunks; the bridge itself is `overlap / 5`
/// trailing words. Zero disables overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    pub min: usize,
    pub target: usize,
    pub max: usize,
    #[serde(default)]
    pub overlap: usize,
}

impl ChunkParams {
    pub fn new(min: usize, target: usize, max: usize) -> Self {
        Self {
            min,
            target,
            max,
            overlap: 0,
        }
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Number of trailing words bridged into the next chunk.
    pub fn overlap_words(&self) -> usize {
        if self.overlap == 0 {
            0
        } else {
            (self.overlap / 5).max(1)
        }
    }
}

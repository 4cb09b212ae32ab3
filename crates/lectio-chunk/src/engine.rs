//! Shared accumulate/flush engine behind every chunking strategy.
//!
//! Greedy bin-packing: sections accumulate until the buffer reaches
//! `target`, flushing early only when the next piece would overflow `max`
//! and the buffer already meets `min`. A buffer still under `min` carries
//! forward instead, so undersized passages are never emitted mid-stream.
//! Determinism and boundary locality are preferred over exact size
//! uniformity.

use crate::filter::{NOISE_FLOOR, SOLE_CHUNK_FLOOR, is_boilerplate};
use crate::params::ChunkParams;
use crate::passage::Passage;
use crate::section::{Locus, Span};
use crate::splitter::{hard_split, split_sentences, trailing_words};

pub(crate) struct PassageBuilder<'a> {
    params: &'a ChunkParams,
    sep: &'static str,
    buf: String,
    span: Span,
    done: Vec<(String, Span)>,
    bridge: String,
}

impl<'a> PassageBuilder<'a> {
    pub fn new(params: &'a ChunkParams, sep: &'static str) -> Self {
        Self {
            params,
            sep,
            buf: String::new(),
            span: Span::default(),
            done: Vec::new(),
            bridge: String::new(),
        }
    }

    /// Add one section's content. A section longer than `max` is re-split
    /// by sentence boundaries (and hard-split at word boundaries if a
    /// single sentence still exceeds `max`) through the same
    /// accumulate/flush rule.
    pub fn push(&mut self, text: &str, locus: &Locus, speaker: Option<&str>) {
        let text = text.trim();
        if text.is_empty() || is_boilerplate(text) {
            return;
        }
        if text.len() > self.params.max {
            for sentence in split_sentences(text) {
                if sentence.len() > self.params.max {
                    for piece in hard_split(&sentence, self.params.max) {
                        self.push_piece(&piece, locus, speaker);
                    }
                } else {
                    self.push_piece(&sentence, locus, speaker);
                }
            }
        } else {
            self.push_piece(text, locus, speaker);
        }
    }

    /// Add one section's content without decomposition, for pre-formatted
    /// text whose internal layout must survive intact.
    pub fn push_whole(&mut self, text: &str, locus: &Locus) {
        let text = text.trim_end();
        if text.trim().is_empty() || is_boilerplate(text) {
            return;
        }
        self.push_piece(text, locus, None);
    }

    fn push_piece(&mut self, piece: &str, locus: &Locus, speaker: Option<&str>) {
        let projected = if self.buf.is_empty() {
            piece.len()
        } else {
            self.buf.len() + self.sep.len() + piece.len()
        };
        // Flush before adding when the piece would overflow the window —
        // unless the buffer is still under `min`, which carries forward
        // rather than emitting an undersized passage.
        if projected > self.params.max && self.buf.len() >= self.params.min {
            self.flush();
        }
        if self.buf.is_empty() {
            self.span = Span {
                start: locus.clone(),
                end: locus.clone(),
                speaker: speaker.map(str::to_string),
            };
            if !self.bridge.is_empty() {
                self.buf.push_str(&self.bridge);
                self.bridge.clear();
            }
        }
        if !self.buf.is_empty() {
            self.buf.push_str(self.sep);
        }
        self.buf.push_str(piece);
        self.span.end = locus.clone();
        if self.buf.len() >= self.params.target {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let content = self.buf.trim().to_string();
        self.buf.clear();
        let span = std::mem::take(&mut self.span);
        if content.len() < NOISE_FLOOR || is_boilerplate(&content) {
            return;
        }
        if self.params.overlap > 0 {
            self.bridge = trailing_words(&content, self.params.overlap_words());
        }
        self.done.push((content, span));
    }

    /// Resolve the final remainder and index the passages.
    ///
    /// An under-`min` remainder is appended to the previous passage rather
    /// than emitted alone or dropped; with no previous passage it is still
    /// emitted when it clears the sole-chunk floor, so degenerate documents
    /// are not silently lost.
    pub fn finish(mut self) -> Vec<Passage> {
        let remainder = self.buf.trim().to_string();
        if !remainder.is_empty() && !is_boilerplate(&remainder) {
            if remainder.len() >= self.params.min {
                let span = std::mem::take(&mut self.span);
                self.done.push((remainder, span));
            } else if let Some((prev, prev_span)) = self.done.last_mut() {
                prev.push_str(self.sep);
                prev.push_str(&remainder);
                prev_span.end = self.span.end.clone();
            } else if remainder.len() >= SOLE_CHUNK_FLOOR {
                let span = std::mem::take(&mut self.span);
                self.done.push((remainder, span));
            }
        }
        self.done
            .into_iter()
            .enumerate()
            .map(|(index, (content, span))| Passage {
                index,
                content,
                span,
            })
            .collect()
    }
}

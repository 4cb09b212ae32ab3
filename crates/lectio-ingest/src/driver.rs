//! Sequential ingestion driver.
//!
//! Work units are processed strictly in catalog order through a single
//! rate-limited fetcher: fetch, extract, chunk, persist, checkpoint. The
//! checkpoint is saved after every unit, so a crash replays at most the
//! unit in flight. No unit-level failure stops the run; only a malformed
//! catalog (rejected before the loop starts) or a shutdown signal does.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use lectio_chunk::Cascade;
use lectio_core::{
    Author, Catalog, Checkpoint, Chunk, ChunkSink, FetchError, FetchOptions, Fetcher, RateLimiter,
    SharedProgress, Work, cleanup_tmp_files, derive_id, is_shutdown_requested, slugify,
};

use crate::config::{ResolvedWork, Source};
use crate::report;
use crate::stats::{RunSummary, UnitStats};

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub output_dir: PathBuf,
    pub fetch: FetchOptions,
    /// Minimum spacing between requests, shared by every fetch in the run.
    pub request_interval: Duration,
    /// Process only the first N units (testing aid).
    pub max_units: Option<usize>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./corpus"),
            fetch: FetchOptions::default(),
            request_interval: Duration::from_millis(1000),
            max_units: None,
        }
    }
}

/// Run one source's ingestion to completion (or interruption).
pub fn run(source: &Source, opts: &DriverOptions, progress: &SharedProgress) -> Result<RunSummary> {
    let started = Instant::now();
    let source_dir = opts.output_dir.join(&source.name);
    let chunks_dir = source_dir.join("chunks");
    std::fs::create_dir_all(&chunks_dir).context("cannot create output directory")?;
    cleanup_tmp_files(&source_dir).context("failed to clean stale tmp files")?;
    cleanup_tmp_files(&chunks_dir).context("failed to clean stale tmp files")?;

    let mut checkpoint = Checkpoint::load(source_dir.join("checkpoint.json"))?;
    let mut catalog = Catalog::load(&source_dir.join("catalog.json"))?;
    let fetcher = Fetcher::new(RateLimiter::new(opts.request_interval), opts.fetch.clone());

    let works: &[ResolvedWork] = match opts.max_units {
        Some(max) => &source.works[..source.works.len().min(max)],
        None => &source.works,
    };

    log::info!(
        "{}: ingesting {} units ({} already checkpointed)",
        source.name,
        works.len(),
        checkpoint.len()
    );

    let bar = progress.run_bar(&source.name, works.len());
    let is_tty = progress.is_tty();
    let mut summary = RunSummary::new(&source.name, works.len());
    let mut chunk_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut failed_units: Vec<String> = Vec::new();

    for work in works {
        if is_shutdown_requested() {
            log::warn!("{}: shutdown requested, stopping before {}", source.name, work.key);
            summary.interrupted = true;
            break;
        }
        if checkpoint.is_done(&work.key) {
            log::debug!("{}: already done, skipping", work.key);
            summary.skipped += 1;
            bar.inc(1);
            continue;
        }

        let line = progress.unit_line(&work.key);
        line.set_message("fetching...");
        match ingest_unit(work, &source.name, &fetcher, &chunks_dir, &mut catalog, &line) {
            Ok(stats) => {
                catalog
                    .save(&source_dir.join("catalog.json"))
                    .context("failed to save catalog")?;
                checkpoint.mark_done(&work.key)?;
                chunk_counts.insert(work.key.clone(), stats.chunks);
                if !is_tty {
                    stats.log();
                }
                summary.record_completed(stats);
            }
            Err(e) => {
                if e.downcast_ref::<FetchError>().is_some_and(FetchError::is_not_found) {
                    log::warn!("{}: source absent, skipping: {e}", work.key);
                    summary.not_found += 1;
                } else {
                    log::error!("{}: unit failed: {e:#}", work.key);
                    summary.failed += 1;
                }
                failed_units.push(work.key.clone());
            }
        }
        line.finish_and_clear();

        // derived report, refreshed after every unit
        let snapshot = report::build(source, &checkpoint, &chunk_counts, &failed_units);
        if let Err(e) = snapshot.save(&source_dir) {
            log::warn!("could not refresh progress report: {e:#}");
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    summary.elapsed = started.elapsed();
    Ok(summary)
}

/// Fetch, extract, chunk and persist a single work unit.
///
/// The chunk file is finalized (tmp→rename) before the caller saves the
/// catalog and checkpoint, so a crash anywhere in between leaves either a
/// complete unit or no trace of it.
fn ingest_unit(
    work: &ResolvedWork,
    source_name: &str,
    fetcher: &Fetcher,
    chunks_dir: &Path,
    catalog: &mut Catalog,
    line: &indicatif::ProgressBar,
) -> Result<UnitStats> {
    let started = Instant::now();

    let body = fetcher.fetch_text(&work.url).map_err(anyhow::Error::new)?;
    anyhow::ensure!(!body.trim().is_empty(), "empty document at {}", work.url);

    line.set_message("chunking...");
    let cascade = Cascade::for_strategy(work.strategy);
    let sections = cascade.extract(&body, work.strategy);
    anyhow::ensure!(
        !sections.is_empty(),
        "no sections extracted ({} bytes fetched)",
        body.len()
    );

    let passages = work.strategy.chunk(&sections, &work.params);
    anyhow::ensure!(!passages.is_empty(), "chunking produced no passages");

    let mut author = Author::new(&work.author);
    author.era = work.era.clone();
    let author_id = catalog.upsert_author(author);
    let work_id = catalog.upsert_work(Work {
        id: derive_id(&["work", source_name, &work.key]),
        author_id: author_id.clone(),
        title: work.title.clone(),
        slug: slugify(&work.title),
        source: source_name.to_string(),
        source_id: work.key.clone(),
    });

    line.set_message(format!("writing {} chunks...", passages.len()));
    let created_at = Utc::now();
    let mut sink = ChunkSink::new(&work.key, chunks_dir)?;
    for passage in &passages {
        let chunk = Chunk {
            id: derive_id(&[&work_id, &passage.index.to_string(), &passage.content]),
            work_id: work_id.clone(),
            author_id: author_id.clone(),
            content: passage.content.clone(),
            chunk_index: passage.index,
            chunk_type: work.strategy.name().to_string(),
            source: source_name.to_string(),
            source_metadata: serde_json::to_value(&passage.span)
                .context("span serialization failed")?,
            created_at,
        };
        sink.write(&chunk)?;
    }
    let chunks = sink.finalize().context("failed to finalize chunk file")?;

    Ok(UnitStats {
        key: work.key.clone(),
        sections: sections.len(),
        chunks,
        bytes_fetched: body.len(),
        elapsed: started.elapsed(),
    })
}

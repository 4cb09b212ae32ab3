//! Merge pass over an ingested output tree.
//!
//! Layout per source: `<root>/<source>/catalog.json` and
//! `<root>/<source>/chunks/*.jsonl`. The pass reads every catalog in
//! sorted path order (first seen wins), merges author and work identities,
//! rewrites chunk files in place with remapped ids, and writes the unified
//! catalog to `<root>/catalog.json`. Per-source catalogs are left intact as
//! raw inputs; re-running the pass is idempotent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lectio_core::{Catalog, ChunkSink, read_chunk_file, write_json_atomic};

use crate::merge::{IdMap, merge_authors, merge_works, remap_chunk};

#[derive(Debug, Default)]
pub struct MergeReport {
    pub sources: usize,
    pub authors_before: usize,
    pub authors_after: usize,
    pub works_before: usize,
    pub works_after: usize,
    pub chunk_files: usize,
    pub chunks_remapped: usize,
}

/// Run the merge pass. Returns counts for the run summary.
pub fn merge_tree(root: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();

    let catalog_paths = source_catalogs(root)?;
    anyhow::ensure!(
        !catalog_paths.is_empty(),
        "no source catalogs under {}",
        root.display()
    );
    report.sources = catalog_paths.len();

    let mut author_lists = Vec::new();
    let mut work_lists = Vec::new();
    for path in &catalog_paths {
        let catalog = Catalog::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        report.authors_before += catalog.authors.len();
        report.works_before += catalog.works.len();
        author_lists.push(catalog.authors);
        work_lists.push(catalog.works);
    }

    let outcome = merge_authors(&author_lists);
    let (works, work_map) = merge_works(&work_lists, &outcome.id_map);
    report.authors_after = outcome.authors.len();
    report.works_after = works.len();

    for catalog_path in &catalog_paths {
        let chunks_dir = catalog_path
            .parent()
            .context("catalog path has no parent")?
            .join("chunks");
        if !chunks_dir.is_dir() {
            continue;
        }
        report.chunks_remapped +=
            rewrite_chunk_files(&chunks_dir, &outcome.id_map, &work_map, &mut report.chunk_files)?;
    }

    let merged = Catalog {
        authors: outcome.authors,
        works,
    };
    write_json_atomic(&root.join("catalog.json"), &merged)
        .context("failed to write merged catalog")?;

    log::info!(
        "merge: {} sources, authors {} -> {}, works {} -> {}, {} chunks remapped",
        report.sources,
        report.authors_before,
        report.authors_after,
        report.works_before,
        report.works_after,
        report.chunks_remapped
    );
    Ok(report)
}

/// Source catalogs in sorted path order, so canonical choice is stable.
fn source_catalogs(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = root.join("*").join("catalog.json");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .context("invalid glob pattern")?
        .filter_map(|e| e.ok())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Rewrite every chunk file under `chunks_dir`, substituting remapped ids.
/// Untouched files are not rewritten.
fn rewrite_chunk_files(
    chunks_dir: &Path,
    author_map: &IdMap,
    work_map: &IdMap,
    chunk_files: &mut usize,
) -> Result<usize> {
    let pattern = chunks_dir.join("*.jsonl");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .context("invalid glob pattern")?
        .filter_map(|e| e.ok())
        .collect();
    paths.sort();

    let mut remapped_total = 0usize;
    for path in paths {
        *chunk_files += 1;
        let mut chunks = read_chunk_file(&path)?;
        let mut remapped = 0usize;
        for chunk in &mut chunks {
            if remap_chunk(chunk, author_map, work_map) {
                remapped += 1;
            }
        }
        if remapped == 0 {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("chunk file has no stem")?;
        let mut sink = ChunkSink::new(stem, chunks_dir)
            .with_context(|| format!("failed to reopen {}", path.display()))?;
        for chunk in &chunks {
            sink.write(chunk)?;
        }
        sink.finalize()
            .with_context(|| format!("failed to rewrite {}", path.display()))?;
        remapped_total += remapped;
        log::debug!("{}: {remapped} chunks remapped", path.display());
    }
    Ok(remapped_total)
}

//! Output record types and sinks — JSONL chunk files and the work/author
//! catalog, both finalized with atomic tmp→rename.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hex length of derived record ids.
const ID_LEN: usize = 16;

/// Deterministic hex id from stable parts.
///
/// Parts are separated by an unambiguous delimiter so ("ab","c") and
/// ("a","bc") hash differently. Same inputs always yield the same id;
/// nothing on the record path uses randomness.
pub fn derive_id(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.finalize().to_hex()[..ID_LEN].to_string()
}

/// Lowercase URL-safe slug: alphanumerics kept, runs of anything else
/// collapsed to single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// One bounded passage with provenance. Append-only; never mutated after
/// emission except for id substitution during cross-source merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub work_id: String,
    pub author_id: String,
    pub content: String,
    pub chunk_index: usize,
    pub chunk_type: String,
    pub source: String,
    pub source_metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One ingested work. `source_id` is the stable external key used for
/// idempotent "already exists" checks across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub source: String,
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
}

impl Author {
    pub fn new(name: &str) -> Self {
        let slug = slugify(name);
        Self {
            id: derive_id(&["author", &slug]),
            name: name.to_string(),
            slug,
            era: None,
            bio: None,
            wikipedia_url: None,
            birth_year: None,
            death_year: None,
        }
    }
}

/// Serialize `value` to `path` via a sibling tmp file and rename, so the
/// file is never observed half-written.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize")?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename into {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Remove stale .tmp files left by a crashed run.
pub fn cleanup_tmp_files(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Filesystem-safe name for a work-unit key like `kjv:genesis`.
fn unit_filename(unit_key: &str) -> String {
    let safe: String = unit_key
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}.jsonl")
}

/// JSONL chunk writer for one work unit, finalized with tmp→rename.
///
/// A crash before `finalize` leaves only a tmp file, which the next run
/// removes, so a completed unit's records are all-or-nothing on disk.
pub struct ChunkSink {
    writer: BufWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ChunkSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ChunkSink {
    pub fn new(unit_key: &str, output_dir: &Path) -> io::Result<Self> {
        let filename = unit_filename(unit_key);
        let final_path = output_dir.join(&filename);
        let tmp_path = output_dir.join(format!("{filename}.tmp"));

        // Clean up stale tmp file from a crashed run
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            tmp_path,
            final_path,
            row_count: 0,
        })
    }

    pub fn write(&mut self, chunk: &Chunk) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, chunk)?;
        self.writer.write_all(b"\n")?;
        self.row_count += 1;
        Ok(())
    }

    /// Flush and atomically rename tmp → final. Returns rows written.
    pub fn finalize(self) -> io::Result<usize> {
        let row_count = self.row_count;
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        drop(file);
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(row_count)
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }
}

/// Read a chunk JSONL file back into records.
pub fn read_chunk_file(path: &Path) -> Result<Vec<Chunk>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).with_context(|| format!("corrupt record in {}", path.display()))
        })
        .collect()
}

/// Works and authors for one source, rewritten whole after each unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub works: Vec<Work>,
}

impl Catalog {
    /// Load from `path`, or start empty if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("corrupt catalog {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    /// Insert an author unless one with the same slug exists; returns the
    /// id to reference either way.
    pub fn upsert_author(&mut self, author: Author) -> String {
        if let Some(existing) = self.authors.iter().find(|a| a.slug == author.slug) {
            return existing.id.clone();
        }
        let id = author.id.clone();
        self.authors.push(author);
        id
    }

    pub fn find_work(&self, source: &str, source_id: &str) -> Option<&Work> {
        self.works
            .iter()
            .find(|w| w.source == source && w.source_id == source_id)
    }

    /// Insert a work unless one with the same (source, source_id) exists;
    /// returns the id to reference either way.
    pub fn upsert_work(&mut self, work: Work) -> String {
        if let Some(existing) = self.find_work(&work.source, &work.source_id) {
            return existing.id.clone();
        }
        let id = work.id.clone();
        self.works.push(work);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn derive_id_deterministic() {
        let a = derive_id(&["work-1", "0", "In the beginning"]);
        let b = derive_id(&["work-1", "0", "In the beginning"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), ID_LEN);
    }

    #[test]
    fn derive_id_part_boundaries_matter() {
        assert_ne!(derive_id(&["ab", "c"]), derive_id(&["a", "bc"]));
    }

    #[test]
    fn derive_id_content_sensitive() {
        assert_ne!(
            derive_id(&["work-1", "0", "text a"]),
            derive_id(&["work-1", "0", "text b"])
        );
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Marcus Aurelius"), "marcus-aurelius");
        assert_eq!(slugify("John  Chrysostom!"), "john-chrysostom");
        assert_eq!(slugify("  Psalms "), "psalms");
    }

    #[test]
    fn slugify_empty_and_symbols() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("***"), "");
    }

    fn sample_chunk(index: usize) -> Chunk {
        Chunk {
            id: derive_id(&["w", &index.to_string(), "body"]),
            work_id: "w".to_string(),
            author_id: "a".to_string(),
            content: format!("passage number {index} with some body text"),
            chunk_index: index,
            chunk_type: "prose".to_string(),
            source: "test".to_string(),
            source_metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sink_writes_and_finalizes() {
        let dir = TempDir::new().unwrap();
        let mut sink = ChunkSink::new("kjv:genesis", dir.path()).unwrap();
        sink.write(&sample_chunk(0)).unwrap();
        sink.write(&sample_chunk(1)).unwrap();
        let written = sink.finalize().unwrap();
        assert_eq!(written, 2);

        let path = dir.path().join("kjv_genesis.jsonl");
        let chunks = read_chunk_file(&path).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn unfinalized_sink_leaves_only_tmp() {
        let dir = TempDir::new().unwrap();
        {
            let mut sink = ChunkSink::new("kjv:genesis", dir.path()).unwrap();
            sink.write(&sample_chunk(0)).unwrap();
            // dropped without finalize — simulated crash
        }
        assert!(!dir.path().join("kjv_genesis.jsonl").exists());
        assert!(dir.path().join("kjv_genesis.jsonl.tmp").exists());

        cleanup_tmp_files(dir.path()).unwrap();
        assert!(!dir.path().join("kjv_genesis.jsonl.tmp").exists());
    }

    #[test]
    fn catalog_upsert_idempotent() {
        let mut catalog = Catalog::default();
        let a1 = catalog.upsert_author(Author::new("Marcus Aurelius"));
        let a2 = catalog.upsert_author(Author::new("Marcus Aurelius"));
        assert_eq!(a1, a2);
        assert_eq!(catalog.authors.len(), 1);

        let work = Work {
            id: derive_id(&["work", "test", "meditations"]),
            author_id: a1.clone(),
            title: "Meditations".to_string(),
            slug: "meditations".to_string(),
            source: "test".to_string(),
            source_id: "meditations".to_string(),
        };
        let w1 = catalog.upsert_work(work.clone());
        let w2 = catalog.upsert_work(work);
        assert_eq!(w1, w2);
        assert_eq!(catalog.works.len(), 1);
    }

    #[test]
    fn catalog_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::default();
        catalog.upsert_author(Author::new("Augustine"));
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.authors.len(), 1);
        assert_eq!(loaded.authors[0].name, "Augustine");
    }

    #[test]
    fn catalog_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::load(&dir.path().join("catalog.json")).unwrap();
        assert!(catalog.authors.is_empty());
        assert!(catalog.works.is_empty());
    }
}

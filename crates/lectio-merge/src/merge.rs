//! Canonical author/work merging and id remapping

use lectio_core::{Author, Chunk, Work};
use rustc_hash::FxHashMap;

use crate::normalize::normalize_name;

/// Old id → canonical id. Ids absent from the map pass through unchanged.
pub type IdMap = FxHashMap<String, String>;

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub authors: Vec<Author>,
    pub id_map: IdMap,
    /// Records folded into an earlier canonical record.
    pub merged: usize,
}

/// Merge author lists from independent sources into one canonical list.
///
/// Equivalence is normalized-name equality. The first author seen in
/// iteration order becomes canonical; later duplicates contribute only
/// scalar fields the canonical record is missing — existing values are
/// never overwritten.
pub fn merge_authors(lists: &[Vec<Author>]) -> MergeOutcome {
    let mut by_key: FxHashMap<String, usize> = FxHashMap::default();
    let mut outcome = MergeOutcome::default();

    for list in lists {
        for author in list {
            let key = normalize_name(&author.name);
            match by_key.get(&key) {
                Some(&idx) => {
                    let canonical = &mut outcome.authors[idx];
                    fill_missing(canonical, author);
                    if author.id != canonical.id {
                        outcome.id_map.insert(author.id.clone(), canonical.id.clone());
                        outcome.merged += 1;
                    }
                }
                None => {
                    by_key.insert(key, outcome.authors.len());
                    outcome.authors.push(author.clone());
                }
            }
        }
    }
    outcome
}

/// Copy scalar fields the canonical record lacks. Never overwrites.
fn fill_missing(canonical: &mut Author, other: &Author) {
    if canonical.era.is_none() {
        canonical.era = other.era.clone();
    }
    if canonical.bio.is_none() {
        canonical.bio = other.bio.clone();
    }
    if canonical.wikipedia_url.is_none() {
        canonical.wikipedia_url = other.wikipedia_url.clone();
    }
    if canonical.birth_year.is_none() {
        canonical.birth_year = other.birth_year;
    }
    if canonical.death_year.is_none() {
        canonical.death_year = other.death_year;
    }
}

/// Deduplicate works after author remapping: two works are the same when
/// their canonical author and normalized title match. First seen wins.
pub fn merge_works(lists: &[Vec<Work>], author_map: &IdMap) -> (Vec<Work>, IdMap) {
    let mut by_key: FxHashMap<(String, String), String> = FxHashMap::default();
    let mut works = Vec::new();
    let mut id_map = IdMap::default();

    for list in lists {
        for work in list {
            let mut work = work.clone();
            remap_id(&mut work.author_id, author_map);
            let key = (work.author_id.clone(), normalize_name(&work.title));
            match by_key.get(&key) {
                Some(canonical_id) => {
                    if work.id != *canonical_id {
                        id_map.insert(work.id.clone(), canonical_id.clone());
                    }
                }
                None => {
                    by_key.insert(key, work.id.clone());
                    works.push(work);
                }
            }
        }
    }
    (works, id_map)
}

/// Substitute a chunk's foreign keys through the maps. Unmapped ids pass
/// through unchanged — a deliberate defensive default for partially
/// ingested trees, not an error.
pub fn remap_chunk(chunk: &mut Chunk, author_map: &IdMap, work_map: &IdMap) -> bool {
    let a = remap_id(&mut chunk.author_id, author_map);
    let w = remap_id(&mut chunk.work_id, work_map);
    a || w
}

fn remap_id(id: &mut String, map: &IdMap) -> bool {
    if let Some(canonical) = map.get(id.as_str()) {
        if canonical != id {
            *id = canonical.clone();
            return true;
        }
    }
    false
}

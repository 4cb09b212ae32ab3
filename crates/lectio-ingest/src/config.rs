//! Source catalog configuration.
//!
//! A catalog is a TOML file declaring the source name and an ordered list
//! of work units. Any malformed entry aborts the run before the first
//! fetch: continuing would silently skip every remaining unit.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use lectio_chunk::{ChunkParams, Strategy};
use serde::Deserialize;

/// Raw TOML shape of a source catalog.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub source: SourceMeta,
    #[serde(default)]
    pub works: Vec<WorkSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceMeta {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One declared work unit. `key` is the stable checkpoint key; order in
/// the file is processing order.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkSpec {
    pub key: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub era: Option<String>,
    pub url: String,
    pub strategy: String,
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub target: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub overlap: Option<usize>,
}

/// A validated work unit ready for the driver.
#[derive(Debug, Clone)]
pub struct ResolvedWork {
    pub key: String,
    pub title: String,
    pub author: String,
    pub era: Option<String>,
    pub url: String,
    pub strategy: Strategy,
    pub params: ChunkParams,
}

/// A validated source: name plus ordered work units.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub works: Vec<ResolvedWork>,
}

impl SourceConfig {
    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Source> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read source catalog {}", path.display()))?;
        let config: SourceConfig = toml::from_str(&content)
            .with_context(|| format!("cannot parse source catalog {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid source catalog {}", path.display()))
    }

    fn validate(self) -> Result<Source> {
        let name = self.source.name.trim().to_string();
        ensure!(!name.is_empty(), "source.name must not be empty");
        ensure!(!self.works.is_empty(), "catalog declares no works");

        let mut seen = std::collections::HashSet::new();
        let mut works = Vec::with_capacity(self.works.len());
        for spec in self.works {
            let work = spec.resolve()?;
            ensure!(
                seen.insert(work.key.clone()),
                "duplicate work key: {}",
                work.key
            );
            works.push(work);
        }
        Ok(Source { name, works })
    }
}

impl WorkSpec {
    fn resolve(self) -> Result<ResolvedWork> {
        ensure!(!self.key.trim().is_empty(), "work key must not be empty");
        let label = &self.key;
        ensure!(!self.title.trim().is_empty(), "{label}: title must not be empty");
        ensure!(!self.author.trim().is_empty(), "{label}: author must not be empty");
        ensure!(
            self.url.starts_with("http://") || self.url.starts_with("https://"),
            "{label}: url must be http(s), got {:?}",
            self.url
        );

        let Some(strategy) = Strategy::from_name(&self.strategy) else {
            bail!("{label}: unknown strategy {:?}", self.strategy);
        };

        let defaults = strategy.default_params();
        let params = ChunkParams {
            min: self.min.unwrap_or(defaults.min),
            target: self.target.unwrap_or(defaults.target),
            max: self.max.unwrap_or(defaults.max),
            overlap: self.overlap.unwrap_or(defaults.overlap),
        };
        ensure!(
            params.min > 0 && params.min <= params.target && params.target <= params.max,
            "{label}: window must satisfy 0 < min <= target <= max, got {params:?}"
        );

        Ok(ResolvedWork {
            key: self.key,
            title: self.title,
            author: self.author,
            era: self.era,
            url: self.url,
            strategy,
            params,
        })
    }
}

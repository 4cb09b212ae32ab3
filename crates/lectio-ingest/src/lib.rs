//! Lectio Ingest - Source configuration and the sequential driver
//!
//! A source catalog declares an ordered list of work units (what to fetch
//! and how to chunk it); the driver walks them strictly in order, skipping
//! checkpointed units and continuing past unit-level failures.

pub mod config;
pub mod driver;
pub mod report;
pub mod stats;

pub use config::{ResolvedWork, Source, SourceConfig};
pub use driver::{DriverOptions, run};
pub use report::ProgressReport;
pub use stats::{RunSummary, UnitStats};

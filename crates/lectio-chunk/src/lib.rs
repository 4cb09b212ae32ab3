//! Lectio Chunk - Content-aware text chunking
//!
//! Converts raw prose, verse, dialogue, and numbered-section text into
//! ordered passages of bounded length with controlled overlap and
//! boundary preservation. Chunking is pure: identical input and
//! parameters always yield identical output.

pub mod cascade;
mod engine;
pub mod filter;
pub mod params;
pub mod passage;
pub mod section;
pub mod splitter;
pub mod strategy;

// Re-exports for convenience
pub use cascade::{Cascade, Extractor};
pub use params::ChunkParams;
pub use passage::Passage;
pub use section::{Locus, Section, SectionKind, Span};
pub use strategy::Strategy;

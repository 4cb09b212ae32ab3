//! Lectio Core - Common infrastructure for corpus ingestion pipelines
//!
//! This crate provides the rate-limited retrying fetch layer, the durable
//! checkpoint store, output record types and sinks, and the logging and
//! progress plumbing shared by every source pipeline.

pub mod checkpoint;
pub mod error;
pub mod fetch;
pub mod limiter;
pub mod logging;
pub mod progress;
pub mod records;
pub mod shutdown;

// Re-exports for convenience
pub use checkpoint::Checkpoint;
pub use error::FetchError;
pub use fetch::{FetchOptions, Fetcher, SHARED_RUNTIME, http_client};
pub use limiter::RateLimiter;
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use records::{
    Author, Catalog, Chunk, ChunkSink, Work, cleanup_tmp_files, derive_id, read_chunk_file,
    slugify, write_json_atomic,
};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};

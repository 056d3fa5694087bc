//! # sitemapgen-core
//!
//! Core functionality for sitemapgen - a batch generator turning a paginated
//! content catalog into a sitemap file set: bounded chunk files plus one index.
//!
//! ## Architecture
//!
//! - **Configuration**: TOML-backed run settings, resolved once per run
//! - **Sources**: lazy per-partition record iteration
//! - **Rendering**: exact sitemap XML fragments and worst-case size margins
//! - **Writing**: chunk rotation under entry-count and byte ceilings, optional gzip
//! - **Upload**: batch hand-off of the finished directory to a storage backend
//! - **Error Handling**: one error type with categories and recovery hints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitemapgen_core::{GeneratorConfig, JsonLinesSource, LocalFsBackend, SitemapGenerator};
//! use std::path::Path;
//!
//! let config = GeneratorConfig::load(Path::new("sitemapgen.toml"))?;
//! let source = JsonLinesSource::open("catalog.jsonl", config.locale.variants.clone())?;
//! let backend = LocalFsBackend::new(&config.storage.root);
//!
//! let report = SitemapGenerator::new(config)?.run(&source, &backend)?;
//! println!("{} chunk files, {} entries", report.chunks.len(), report.total_entries());
//! # Ok::<(), sitemapgen_core::Error>(())
//! ```

/// Run configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// Worst-case size margins
pub mod estimate;
/// Sitemap XML fragments
pub mod format;
/// Run orchestration
pub mod generator;
/// Partition priorities
pub mod priority;
/// Run-scoped scratch directory
pub mod scratch;
/// Plain and gzip output streams
pub mod sink;
/// Record sources and partition resolution
pub mod source;
/// Core data types
pub mod types;
/// Storage backend contract and uploader
pub mod upload;
/// Canonical URL construction
pub mod urls;
/// Reading generated files back
pub mod verify;
/// Chunk and index writers
pub mod writer;

pub use config::{GeneratorConfig, LimitsConfig, LocaleConfig, OutputConfig, SiteConfig};
pub use error::{Error, Result};
pub use generator::{PartitionReport, RunReport, SitemapGenerator};
pub use priority::PriorityTable;
pub use sink::Compression;
pub use source::{JsonLinesSource, MemorySource, RecordSource, resolve_partitions};
pub use types::{PartitionId, Record, iso8601};
pub use upload::{BatchOutcome, FileBackend, LocalFsBackend, StorageUploader, StoreOp};
pub use writer::ChunkInfo;

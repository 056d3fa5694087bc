//! Sitemap generation run.
//!
//! [`SitemapGenerator`] drives one run end to end:
//!
//! 1. resolve the partition set
//! 2. open the index file in a fresh scratch directory
//! 3. for each partition, stream its records into rotating chunk files
//! 4. close the index
//! 5. hand the directory to the storage backend
//! 6. remove the scratch directory (also when any earlier step failed)
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use sitemapgen_core::{
//!     GeneratorConfig, LocalFsBackend, MemorySource, PartitionId, Record, SitemapGenerator,
//! };
//!
//! let scratch = tempfile::tempdir()?;
//! let store = tempfile::tempdir()?;
//!
//! let mut config = GeneratorConfig::default();
//! config.site.server = "https://wiki.example.org".into();
//! config.output.scratch_root = Some(scratch.path().to_path_buf());
//! config.output.compress = false;
//!
//! let touched = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
//! let source = MemorySource::new(vec![
//!     Record::new(1, PartitionId(0), "Main_Page", touched),
//!     Record::new(2, PartitionId(0), "Old", touched).with_redirect(true),
//! ]);
//!
//! let report = SitemapGenerator::new(config)?.run(&source, &LocalFsBackend::new(store.path()))?;
//! assert_eq!(report.chunks.len(), 1);
//! assert_eq!(report.partitions[0].skipped_redirects, Some(1));
//! assert!(store.path().join("sitemaps/NS_0-0.xml").exists());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::estimate::SizeMargins;
use crate::priority::PriorityTable;
use crate::scratch::ScratchDir;
use crate::sink::Compression;
use crate::source::{RecordSource, resolve_partitions};
use crate::upload::{BatchOutcome, FileBackend, StorageUploader};
use crate::urls::UrlScheme;
use crate::writer::{ChunkInfo, ChunkSettings, ChunkWriter, IndexWriter};
use crate::{GeneratorConfig, PartitionId, Result, format, iso8601};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Diagnostics for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionReport {
    /// Partition this report covers.
    pub partition: PartitionId,
    /// Human label, e.g. `(Main)` or the title prefix.
    pub label: String,
    /// Priority written on every entry of the partition.
    pub priority: String,
    /// Chunk filenames written for this partition, in order.
    pub files: Vec<String>,
    /// Records written (each counts once, however many variants it has).
    pub records: usize,
    /// Entries written, variant entries included.
    pub entries: usize,
    /// Records left out because they opted out of indexing.
    pub skipped_excluded: usize,
    /// Only reported when redirect skipping is enabled.
    pub skipped_redirects: Option<usize>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Shared `<lastmod>` of every index row.
    pub timestamp: String,
    /// Local path of the index file.
    pub index_file: PathBuf,
    /// Chunks in index order.
    pub chunks: Vec<ChunkInfo>,
    /// Per-partition diagnostics, in processing order.
    pub partitions: Vec<PartitionReport>,
    /// Absent when the run only wrote locally.
    pub upload: Option<BatchOutcome>,
}

impl RunReport {
    /// Total entries across every chunk.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.chunks.iter().map(|c| c.entries).sum()
    }
}

/// Orchestrates partition iteration, chunk writing and upload.
#[derive(Debug, Clone)]
pub struct SitemapGenerator {
    config: GeneratorConfig,
    priorities: PriorityTable,
    scheme: UrlScheme,
}

impl SitemapGenerator {
    /// Validate the configuration and build the immutable run tables.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let priorities = PriorityTable::with_overrides(&config.priorities)?;
        let scheme = UrlScheme::from_config(&config)?;
        Ok(Self {
            config,
            priorities,
            scheme,
        })
    }

    /// Validated configuration this generator runs with.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Priority table resolved from the configuration.
    #[must_use]
    pub const fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Generate into a scratch directory, upload, and clean up.
    pub fn run(&self, source: &dyn RecordSource, backend: &dyn FileBackend) -> Result<RunReport> {
        self.run_at(source, backend, Utc::now())
    }

    /// [`run`](Self::run) with an explicit run timestamp.
    #[instrument(skip_all, fields(site = %self.config.site.id))]
    pub fn run_at(
        &self,
        source: &dyn RecordSource,
        backend: &dyn FileBackend,
        now: DateTime<Utc>,
    ) -> Result<RunReport> {
        let scratch = ScratchDir::create(&self.config.scratch_root(), &self.config.site.id)?;
        let mut report = self.generate_into(source, scratch.path(), now)?;

        let uploader = StorageUploader::new(backend, self.config.storage.prefix.clone());
        report.upload = Some(uploader.upload(scratch.path())?);
        Ok(report)
    }

    /// Write the index and all chunks into `dir` without uploading.
    pub fn generate_into(
        &self,
        source: &dyn RecordSource,
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<RunReport> {
        let partitions = resolve_partitions(&self.config, source)?;
        let timestamp = iso8601(now);
        let settings = ChunkSettings {
            dir: dir.to_path_buf(),
            file_prefix: self.config.output.file_prefix.clone(),
            compression: Compression::from_flag(self.config.output.compress),
            limits: self.config.limits,
        };

        let mut index = IndexWriter::create(
            dir.join(&self.config.output.index_name),
            self.config.url_prefix(),
            timestamp.clone(),
        )?;

        let mut chunks = Vec::new();
        let mut reports = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let (report, written) =
                self.write_partition(source, partition, &settings, &mut index, now)?;
            chunks.extend(written);
            reports.push(report);
        }

        let index_file = index.finish()?;
        info!(
            index = %index_file.display(),
            chunks = chunks.len(),
            "Wrote sitemap index"
        );

        Ok(RunReport {
            timestamp,
            index_file,
            chunks,
            partitions: reports,
            upload: None,
        })
    }

    #[instrument(skip_all, fields(partition = %partition))]
    fn write_partition(
        &self,
        source: &dyn RecordSource,
        partition: PartitionId,
        settings: &ChunkSettings,
        index: &mut IndexWriter,
        now: DateTime<Utc>,
    ) -> Result<(PartitionReport, Vec<ChunkInfo>)> {
        let skip_redirects = self.config.output.skip_redirects;
        let default_locale = self.config.locale.default.as_str();
        let priority = self.priorities.priority(partition);
        let label = self.scheme.label(partition);
        info!(label = %label, "Generating partition");

        let margins = SizeMargins::for_partition(
            &self.scheme,
            partition,
            priority,
            &self.config.locale.variants,
            now,
        );
        let mut writer = ChunkWriter::new(settings, index, partition, margins);

        let mut records = 0;
        let mut entries = 0;
        let mut skipped_excluded = 0;
        let mut skipped_redirects = 0;

        for record in source.records(partition)? {
            let record = record?;
            if record.excluded {
                skipped_excluded += 1;
                continue;
            }
            if skip_redirects && record.redirect {
                skipped_redirects += 1;
                continue;
            }
            if !writer.is_open() {
                writer.open_next()?;
            }

            let lastmod = iso8601(record.touched);
            let url = self.scheme.canonical_url(partition, &record.title);
            writer.write(&format::file_entry(&url, &lastmod, priority))?;
            entries += 1;

            for code in record.extra_variants(default_locale) {
                let url = self.scheme.variant_url(partition, &record.title, code);
                writer.write(&format::file_entry(&url, &lastmod, priority))?;
                entries += 1;
            }
            records += 1;
        }

        let written = writer.finish()?;
        for chunk in &written {
            info!(file = %chunk.path.display(), entries = chunk.entries, "Wrote chunk");
        }
        if skipped_excluded > 0 {
            info!(count = skipped_excluded, "Skipped excluded record(s)");
        }
        if skip_redirects && skipped_redirects > 0 {
            info!(count = skipped_redirects, "Skipped redirect(s)");
        }

        let report = PartitionReport {
            partition,
            label,
            priority: priority.to_string(),
            files: written.iter().map(|c| c.filename.clone()).collect(),
            records,
            entries,
            skipped_excluded,
            skipped_redirects: skip_redirects.then_some(skipped_redirects),
        };
        Ok((report, written))
    }
}

//! Chunk and index file writers.
//!
//! [`ChunkWriter`] owns at most one open chunk at a time and rotates to a new
//! chunk whenever the next entry would break either ceiling:
//!
//! ```text
//!            open_next()                 write() / rotation
//!  Closed ───────────────▶ Open ──────────────────────────▶ Open (next seq)
//!    ▲                      │
//!    └──── close() ─────────┘   finish() closes if open, no-op otherwise
//! ```
//!
//! Every chunk that is opened also gets exactly one row in the index, written
//! at open time. Since chunks never overlap, index order is finalization order.

use crate::estimate::SizeMargins;
use crate::sink::{ByteSink, Compression};
use crate::{Error, LimitsConfig, PartitionId, Result, format};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A finalized (or currently open) chunk file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    /// Partition the chunk belongs to.
    pub partition: PartitionId,
    /// Zero-based sequence number within the partition.
    pub sequence: usize,
    /// File name, e.g. `NS_0-0.xml.gz`.
    pub filename: String,
    /// Public URL as listed in the index.
    pub url: String,
    /// Local path of the file.
    pub path: PathBuf,
    /// Entries written so far.
    pub entries: usize,
    /// Uncompressed length, header and footer included.
    pub bytes: usize,
}

/// Settings shared by every chunk writer of a run.
#[derive(Debug, Clone)]
pub struct ChunkSettings {
    /// Directory chunk files are created in.
    pub dir: PathBuf,
    /// Prefix of every chunk file name.
    pub file_prefix: String,
    /// Encoding applied to every chunk.
    pub compression: Compression,
    /// Entry and byte ceilings per chunk.
    pub limits: LimitsConfig,
}

impl ChunkSettings {
    /// Deterministic chunk filename, e.g. `NS_0-3.xml.gz`.
    #[must_use]
    pub fn filename(&self, partition: PartitionId, sequence: usize) -> String {
        format!(
            "{}{partition}-{sequence}.xml{}",
            self.file_prefix,
            self.compression.extension()
        )
    }
}

/// Writer for the top-level index file. Always uncompressed.
#[derive(Debug)]
pub struct IndexWriter {
    sink: ByteSink,
    path: PathBuf,
    url_prefix: String,
    lastmod: String,
    entries: usize,
}

impl IndexWriter {
    /// Create the index file and write its header.
    pub fn create(path: PathBuf, url_prefix: String, lastmod: String) -> Result<Self> {
        let mut sink = Compression::None.open(&path)?;
        sink.write_str(&format::open_index())?;
        Ok(Self {
            sink,
            path,
            url_prefix,
            lastmod,
            entries: 0,
        })
    }

    /// Append a row for `filename` and return its public URL.
    pub fn add(&mut self, filename: &str) -> Result<String> {
        let url = format!("{}{filename}", self.url_prefix);
        self.sink
            .write_str(&format::index_entry(&url, &self.lastmod))?;
        self.entries += 1;
        Ok(url)
    }

    /// Rows written so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries
    }

    /// True before the first row is written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Local path of the index file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the footer and close the file.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.sink.write_str(format::close_index())?;
        self.sink.close()?;
        Ok(self.path)
    }
}

#[derive(Debug)]
struct OpenChunk {
    sink: ByteSink,
    info: ChunkInfo,
}

/// Per-partition chunk state. Create a fresh one for every partition.
#[derive(Debug)]
pub struct ChunkWriter<'a> {
    settings: &'a ChunkSettings,
    index: &'a mut IndexWriter,
    partition: PartitionId,
    margins: SizeMargins,
    next_sequence: usize,
    current: Option<OpenChunk>,
    finished: Vec<ChunkInfo>,
}

impl<'a> ChunkWriter<'a> {
    /// Writer for `partition`, starting at sequence 0 with no chunk open.
    pub fn new(
        settings: &'a ChunkSettings,
        index: &'a mut IndexWriter,
        partition: PartitionId,
        margins: SizeMargins,
    ) -> Self {
        Self {
            settings,
            index,
            partition,
            margins,
            next_sequence: 0,
            current: None,
            finished: Vec::new(),
        }
    }

    /// True while a chunk is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Open the next chunk in sequence, write its header and its index row.
    ///
    /// A chunk that is still open is closed first.
    pub fn open_next(&mut self) -> Result<&ChunkInfo> {
        if self.current.is_some() {
            self.close()?;
        }

        let sequence = self.next_sequence;
        let filename = self.settings.filename(self.partition, sequence);
        let path = self.settings.dir.join(&filename);

        let mut sink = self.settings.compression.open(&path)?;
        let header = format::open_file();
        sink.write_str(&header)?;
        let url = self.index.add(&filename)?;
        self.next_sequence += 1;

        debug!(partition = %self.partition, file = %path.display(), "Opened chunk");

        let chunk = self.current.insert(OpenChunk {
            sink,
            info: ChunkInfo {
                partition: self.partition,
                sequence,
                filename,
                url,
                path,
                entries: 0,
                bytes: header.len(),
            },
        });
        Ok(&chunk.info)
    }

    /// Append one entry, rotating first if it would break a ceiling.
    ///
    /// A chunk always accepts its first entry, even one larger than the byte
    /// ceiling on its own.
    pub fn write(&mut self, entry: &str) -> Result<()> {
        let rotate = {
            let chunk = self
                .current
                .as_ref()
                .ok_or_else(|| Error::Stream(format!("write to closed chunk for partition {}", self.partition)))?;
            chunk.info.entries > 0 && self.would_overflow(&chunk.info, entry.len())
        };
        if rotate {
            self.open_next()?;
        }

        let limits = self.settings.limits;
        let close_len = self.margins.close;
        let chunk = self
            .current
            .as_mut()
            .ok_or_else(|| Error::Stream("chunk vanished during rotation".into()))?;

        if chunk.info.entries == 0 && chunk.info.bytes + entry.len() + close_len > limits.max_bytes {
            warn!(
                file = %chunk.info.filename,
                bytes = entry.len(),
                max_bytes = limits.max_bytes,
                "Single entry exceeds the size ceiling; writing it alone"
            );
        }

        chunk.sink.write_str(entry)?;
        chunk.info.entries += 1;
        chunk.info.bytes += entry.len();
        Ok(())
    }

    fn would_overflow(&self, info: &ChunkInfo, entry_len: usize) -> bool {
        let limits = self.settings.limits;
        info.entries + 1 > limits.max_entries
            || info.bytes + self.margins.entry.max(entry_len) + self.margins.close > limits.max_bytes
    }

    /// Write the footer and close the open chunk.
    pub fn close(&mut self) -> Result<()> {
        let Some(OpenChunk { mut sink, mut info }) = self.current.take() else {
            return Err(Error::Stream(format!(
                "close of already closed chunk for partition {}",
                self.partition
            )));
        };
        let footer = format::close_file();
        sink.write_str(footer)?;
        sink.close()?;
        info.bytes += footer.len();

        debug!(
            file = %info.filename,
            entries = info.entries,
            bytes = info.bytes,
            "Closed chunk"
        );
        self.finished.push(info);
        Ok(())
    }

    /// Close the open chunk, if any, and return every chunk written.
    pub fn finish(mut self) -> Result<Vec<ChunkInfo>> {
        if self.current.is_some() {
            self.close()?;
        }
        Ok(self.finished)
    }
}

//! Byte sinks for chunk files.
//!
//! The compression mode is chosen once per run; every stream opened through
//! it uses the same encoding for header, entries and footer.

use crate::{Error, Result};
use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output encoding for chunk files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain XML.
    None,
    /// Gzip-compressed XML (`.xml.gz`).
    Gzip,
}

impl Compression {
    /// `Gzip` when `compress` is set, `None` otherwise.
    #[must_use]
    pub const fn from_flag(compress: bool) -> Self {
        if compress { Self::Gzip } else { Self::None }
    }

    /// Filename extension appended after `.xml`.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
        }
    }

    /// Create (or truncate) `path` and wrap it in the selected encoder.
    pub fn open(self, path: &Path) -> Result<ByteSink> {
        let file = File::create(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("error opening {} for writing: {e}", path.display()),
            ))
        })?;
        let inner = BufWriter::new(file);
        Ok(match self {
            Self::None => ByteSink::Plain(inner),
            Self::Gzip => ByteSink::Gzip(GzEncoder::new(inner, GzLevel::default())),
        })
    }
}

/// An open, writable output stream.
pub enum ByteSink {
    /// Uncompressed file.
    Plain(BufWriter<File>),
    /// Gzip-encoded file.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl ByteSink {
    /// Append UTF-8 text to the stream.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        match self {
            Self::Plain(w) => w.write_all(s.as_bytes())?,
            Self::Gzip(w) => w.write_all(s.as_bytes())?,
        }
        Ok(())
    }

    /// Flush everything, write the gzip trailer if any, and sync the file.
    pub fn close(self) -> Result<()> {
        let buffered = match self {
            Self::Plain(w) => w,
            Self::Gzip(w) => w.finish()?,
        };
        let file = buffered.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for ByteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("ByteSink::Plain"),
            Self::Gzip(_) => f.write_str("ByteSink::Gzip"),
        }
    }
}

//! Reading generated sitemaps back and checking them against limits.
//!
//! ## Quick Start
//!
//! ```rust
//! use sitemapgen_core::verify::parse_urlset;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.org/wiki/A&amp;B</loc>
//!     <lastmod>2024-01-15T10:30:00Z</lastmod>
//!     <priority>0.5</priority>
//!   </url>
//! </urlset>"#;
//!
//! let entries = parse_urlset(xml)?;
//! assert_eq!(entries[0].loc, "https://example.org/wiki/A&B");
//! # Ok::<(), sitemapgen_core::Error>(())
//! ```

use crate::{Error, LimitsConfig, Result};
use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// One `<url>` of a chunk file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlEntry {
    /// Unescaped `<loc>` text.
    pub loc: String,
    /// `<lastmod>` text, if present.
    pub lastmod: Option<String>,
    /// `<priority>` text, if present.
    pub priority: Option<String>,
}

/// One `<sitemap>` row of an index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Unescaped `<loc>` text.
    pub loc: String,
    /// `<lastmod>` text, if present.
    pub lastmod: Option<String>,
}

/// Summary of one chunk file on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkCheck {
    /// Chunk file name as listed in the index.
    pub filename: String,
    /// Number of `<url>` entries.
    pub entries: usize,
    /// Uncompressed size.
    pub bytes: usize,
}

/// Result of checking a directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    /// Rows of the index file.
    pub index: Vec<IndexEntry>,
    /// Indexed chunks found on disk.
    pub chunks: Vec<ChunkCheck>,
    /// Human-readable problems; empty when the directory is consistent.
    pub problems: Vec<String>,
}

impl VerifyReport {
    /// True when no problem was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Parse a sitemap (`<urlset>`) document.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_urlset(xml: &str) -> Result<Vec<UrlEntry>> {
    let rows = parse_rows(xml, "url", &["loc", "lastmod", "priority"])?;
    Ok(rows
        .into_iter()
        .map(|mut fields| UrlEntry {
            loc: fields[0].take().unwrap_or_default(),
            lastmod: fields[1].take(),
            priority: fields[2].take(),
        })
        .collect())
}

/// Parse a sitemap index (`<sitemapindex>`) document.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_index(xml: &str) -> Result<Vec<IndexEntry>> {
    let rows = parse_rows(xml, "sitemap", &["loc", "lastmod"])?;
    Ok(rows
        .into_iter()
        .map(|mut fields| IndexEntry {
            loc: fields[0].take().unwrap_or_default(),
            lastmod: fields[1].take(),
        })
        .collect())
}

/// Collect the text of `fields` inside every `row` element.
fn parse_rows(xml: &str, row: &str, fields: &[&str]) -> Result<Vec<Vec<Option<String>>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rows = Vec::new();
    let mut current: Option<Vec<Option<String>>> = None;
    let mut field: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == row {
                    current = Some(vec![None; fields.len()]);
                } else if current.is_some() {
                    field = fields.iter().position(|f| *f == name);
                }
            },
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == row {
                    if let Some(values) = current.take() {
                        if values[0].is_none() {
                            return Err(Error::Parse(format!("<{row}> without <{}>", fields[0])));
                        }
                        rows.push(values);
                    }
                }
                field = None;
            },
            Ok(Event::Text(e)) => {
                if let (Some(idx), Some(values)) = (field, current.as_mut()) {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    values[idx] = Some(text.trim().to_string());
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
    }

    Ok(rows)
}

/// Read a file, transparently gunzipping `.gz` files.
pub fn read_sitemap_file(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(File::open(path)?).read_to_string(&mut text)?;
    } else {
        File::open(path)?.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Check a generated directory: every indexed chunk exists, every chunk file is
/// indexed, and each chunk respects `limits` (a lone oversized entry is allowed).
pub fn verify_dir(dir: &Path, index_name: &str, limits: LimitsConfig) -> Result<VerifyReport> {
    let index = parse_index(&read_sitemap_file(&dir.join(index_name))?)?;
    let mut problems = Vec::new();

    let mut on_disk: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.file_name().is_some_and(|n| n != index_name))
        .collect();
    on_disk.sort();

    let indexed: Vec<&str> = index
        .iter()
        .map(|entry| entry.loc.rsplit('/').next().unwrap_or_default())
        .collect();

    let mut chunks = Vec::new();
    for name in &indexed {
        let path = dir.join(name);
        if !path.is_file() {
            problems.push(format!("indexed chunk missing: {name}"));
            continue;
        }
        let text = read_sitemap_file(&path)?;
        let entries = parse_urlset(&text)?.len();
        if entries > limits.max_entries {
            problems.push(format!(
                "{name}: {entries} entries exceeds limit {}",
                limits.max_entries
            ));
        }
        if text.len() > limits.max_bytes && entries > 1 {
            problems.push(format!(
                "{name}: {} bytes exceeds limit {}",
                text.len(),
                limits.max_bytes
            ));
        }
        if entries == 0 {
            problems.push(format!("{name}: chunk is empty"));
        }
        chunks.push(ChunkCheck {
            filename: (*name).to_string(),
            entries,
            bytes: text.len(),
        });
    }

    for path in &on_disk {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !indexed.contains(&name.as_str()) {
            problems.push(format!("chunk not in index: {name}"));
        }
    }

    Ok(VerifyReport {
        index,
        chunks,
        problems,
    })
}

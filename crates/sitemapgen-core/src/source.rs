//! Record sources.
//!
//! A [`RecordSource`] hands out a fresh, lazy record iterator per partition.
//! Iterators are not restartable; the generator asks again for each partition.
//!
//! Two sources are provided:
//!
//! - [`MemorySource`]: records held in memory
//! - [`JsonLinesSource`]: a catalog file with one JSON record per line, re-read
//!   for every partition so memory stays flat regardless of catalog size

use crate::{Error, GeneratorConfig, PartitionId, Record, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lazy sequence of records for one partition.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// Supplier of content records, pre-annotated with exclusion and redirect flags.
pub trait RecordSource {
    /// Distinct partitions present in the source, ascending.
    fn partitions(&self) -> Result<Vec<PartitionId>>;

    /// Records of one partition in the source's natural order.
    fn records(&self, partition: PartitionId) -> Result<RecordIter<'_>>;
}

/// Resolve the partition set for a run.
///
/// An explicit `partitions.include` list wins and is used in the given order
/// (config validation rejects repeated ids). Otherwise
/// every partition the source holds is used, except those whose robots
/// policy contains `noindex`.
pub fn resolve_partitions(
    config: &GeneratorConfig,
    source: &dyn RecordSource,
) -> Result<Vec<PartitionId>> {
    if let Some(include) = &config.partitions.include {
        return Ok(include.iter().copied().map(PartitionId).collect());
    }

    let policies = config.robot_policies()?;
    let discovered = source.partitions()?;
    let resolved: Vec<_> = discovered
        .into_iter()
        .filter(|partition| {
            let noindex = policies
                .get(partition)
                .is_some_and(|policy| policy.contains("noindex"));
            if noindex {
                debug!(partition = %partition, "Skipping noindex partition");
            }
            !noindex
        })
        .collect();
    Ok(resolved)
}

/// In-memory source, ordered as inserted.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Source over `records`, served in insertion order.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl RecordSource for MemorySource {
    fn partitions(&self) -> Result<Vec<PartitionId>> {
        let set: BTreeSet<_> = self.records.iter().map(|r| r.partition).collect();
        Ok(set.into_iter().collect())
    }

    fn records(&self, partition: PartitionId) -> Result<RecordIter<'_>> {
        Ok(Box::new(
            self.records
                .iter()
                .filter(move |r| r.partition == partition)
                .cloned()
                .map(Ok),
        ))
    }
}

/// Catalog file with one JSON [`Record`] per line.
///
/// ```text
/// {"id":1,"namespace":0,"title":"Main_Page","touched":"2024-01-15T10:30:00Z"}
/// {"id":2,"namespace":0,"title":"Old_Name","touched":"2023-02-01T00:00:00Z","redirect":true}
/// {"id":3,"namespace":4,"title":"Sandbox","touched":"2023-02-01T00:00:00Z","noindex":true}
/// ```
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
    default_variants: Vec<String>,
}

impl JsonLinesSource {
    /// Records without a `variants` field inherit `default_variants`.
    pub fn open(path: impl Into<PathBuf>, default_variants: Vec<String>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::Source(format!(
                "catalog not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            default_variants,
        })
    }

    /// Catalog file backing this source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> Result<impl Iterator<Item = Result<Record>> + '_> {
        let file = File::open(&self.path).map_err(|e| {
            Error::Source(format!("cannot open catalog {}: {e}", self.path.display()))
        })?;
        let reader = BufReader::new(file);
        Ok(reader
            .lines()
            .enumerate()
            .filter_map(move |(idx, line)| self.decode(idx + 1, line)))
    }

    fn decode(&self, line_no: usize, line: std::io::Result<String>) -> Option<Result<Record>> {
        let line = match line {
            Ok(line) => line,
            Err(e) => return Some(Err(Error::Source(format!("line {line_no}: {e}")))),
        };
        if line.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str::<Record>(&line)
                .map(|mut record| {
                    if record.variants.is_none() && !self.default_variants.is_empty() {
                        record.variants = Some(self.default_variants.clone());
                    }
                    record
                })
                .map_err(|e| {
                    Error::Source(format!("{}:{line_no}: {e}", self.path.display()))
                }),
        )
    }
}

impl RecordSource for JsonLinesSource {
    fn partitions(&self) -> Result<Vec<PartitionId>> {
        let mut set = BTreeSet::new();
        for record in self.lines()? {
            set.insert(record?.partition);
        }
        Ok(set.into_iter().collect())
    }

    fn records(&self, partition: PartitionId) -> Result<RecordIter<'_>> {
        Ok(Box::new(self.lines()?.filter(move |record| {
            record.as_ref().map_or(true, |r| r.partition == partition)
        })))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(id: u64, ns: i32) -> Record {
        Record::new(id, PartitionId(ns), format!("P{id}"), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn catalog(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_memory_source_partitions_and_order() {
        let source = MemorySource::new(vec![record(3, 4), record(1, 0), record(2, 4), record(5, 1)]);
        assert_eq!(
            source.partitions().unwrap(),
            vec![PartitionId(0), PartitionId(1), PartitionId(4)]
        );
        let ids: Vec<u64> = source
            .records(PartitionId(4))
            .unwrap()
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_resolve_explicit_list_wins() {
        let mut config = GeneratorConfig::default();
        config.partitions.include = Some(vec![14, 0]);
        config
            .partitions
            .robot_policies
            .insert("14".into(), "noindex".into());
        let source = MemorySource::new(vec![record(1, 2)]);
        assert_eq!(
            resolve_partitions(&config, &source).unwrap(),
            vec![PartitionId(14), PartitionId(0)]
        );
    }

    #[test]
    fn test_resolve_discovery_drops_noindex() {
        let mut config = GeneratorConfig::default();
        config
            .partitions
            .robot_policies
            .insert("2".into(), "noindex,nofollow".into());
        config
            .partitions
            .robot_policies
            .insert("4".into(), "index,follow".into());
        let source = MemorySource::new(vec![record(1, 0), record(2, 2), record(3, 4)]);
        assert_eq!(
            resolve_partitions(&config, &source).unwrap(),
            vec![PartitionId(0), PartitionId(4)]
        );
    }

    #[test]
    fn test_jsonl_source_filters_and_inherits_variants() {
        let file = catalog(&[
            r#"{"id":1,"namespace":0,"title":"A","touched":"2024-01-01T00:00:00Z"}"#,
            "",
            r#"{"id":2,"namespace":1,"title":"B","touched":"2024-01-01T00:00:00Z","redirect":true}"#,
            r#"{"id":3,"namespace":0,"title":"C","touched":"2024-01-01T00:00:00Z","variants":[]}"#,
        ]);
        let source = JsonLinesSource::open(file.path(), vec!["en".into(), "en-gb".into()]).unwrap();

        assert_eq!(source.partitions().unwrap(), vec![PartitionId(0), PartitionId(1)]);

        let main: Vec<Record> = source
            .records(PartitionId(0))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].variants.as_deref(), Some(&["en".to_string(), "en-gb".to_string()][..]));
        assert_eq!(main[1].variants.as_deref(), Some(&[][..]));

        let talk: Vec<Record> = source
            .records(PartitionId(1))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert!(talk[0].redirect);
    }

    #[test]
    fn test_jsonl_malformed_line_reports_position() {
        let file = catalog(&[
            r#"{"id":1,"namespace":0,"title":"A","touched":"2024-01-01T00:00:00Z"}"#,
            "{not json",
        ]);
        let source = JsonLinesSource::open(file.path(), Vec::new()).unwrap();
        let err = source.partitions().unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn test_jsonl_missing_catalog() {
        let err = JsonLinesSource::open("/definitely/not/here.jsonl", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }
}

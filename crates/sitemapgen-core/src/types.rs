use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Grouping key records are enumerated under (a wiki namespace id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub i32);

impl PartitionId {
    /// Talk-like partitions are the positive odd ids; everything else is subject-like.
    #[must_use]
    pub const fn is_talk(self) -> bool {
        self.0 > 0 && self.0 % 2 == 1
    }

    /// Content-like partitions: everything that is not talk-like.
    #[must_use]
    pub const fn is_subject(self) -> bool {
        !self.is_talk()
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartitionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| Error::Config(format!("invalid partition id: {s:?}")))
    }
}

/// One content item eligible for the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier within the partition.
    pub id: u64,
    /// Partition (namespace) the record belongs to.
    #[serde(rename = "namespace")]
    pub partition: PartitionId,
    /// Title within the partition, without namespace prefix.
    pub title: String,
    /// Last modification, written as `<lastmod>`.
    pub touched: DateTime<Utc>,
    /// Redirect pages are skipped unless redirect skipping is off.
    #[serde(default)]
    pub redirect: bool,
    /// Explicit opt-out from indexing.
    #[serde(default, rename = "noindex")]
    pub excluded: bool,
    /// Locale variant codes; `None` means no variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

impl Record {
    /// Record with no flags and no variants.
    #[must_use]
    pub fn new(id: u64, partition: PartitionId, title: impl Into<String>, touched: DateTime<Utc>) -> Self {
        Self {
            id,
            partition,
            title: title.into(),
            touched,
            redirect: false,
            excluded: false,
            variants: None,
        }
    }

    /// Set the redirect flag.
    #[must_use]
    pub const fn with_redirect(mut self, redirect: bool) -> Self {
        self.redirect = redirect;
        self
    }

    /// Set the exclusion flag.
    #[must_use]
    pub const fn with_excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    /// Replace the locale variant codes.
    #[must_use]
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = Some(variants.into_iter().map(Into::into).collect());
        self
    }

    /// Variant codes this record renders under, minus the default locale.
    pub fn extra_variants<'a>(&'a self, default_locale: &'a str) -> impl Iterator<Item = &'a str> {
        self.variants
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(move |code| *code != default_locale)
    }
}

/// Format a timestamp the way sitemap `<lastmod>` values are written
/// (`2024-01-15T10:30:00Z`).
#[must_use]
pub fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_talk_classification() {
        assert!(PartitionId(0).is_subject());
        assert!(PartitionId(1).is_talk());
        assert!(PartitionId(14).is_subject());
        assert!(PartitionId(3001).is_talk());
        assert!(PartitionId(-1).is_subject());
        assert!(PartitionId(-2).is_subject());
    }

    #[test]
    fn test_partition_parse() {
        assert_eq!("12".parse::<PartitionId>().unwrap(), PartitionId(12));
        assert_eq!(" -2 ".parse::<PartitionId>().unwrap(), PartitionId(-2));
        assert!("main".parse::<PartitionId>().is_err());
    }

    #[test]
    fn test_iso8601_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(iso8601(ts), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_extra_variants_skip_default() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let record = Record::new(1, PartitionId(0), "Main_Page", ts)
            .with_variants(["zh", "zh-hans", "zh-hant"]);
        let extra: Vec<_> = record.extra_variants("zh").collect();
        assert_eq!(extra, vec!["zh-hans", "zh-hant"]);

        let plain = Record::new(2, PartitionId(0), "Other", ts);
        assert_eq!(plain.extra_variants("en").count(), 0);
    }

    #[test]
    fn test_record_json_shape() {
        let line = r#"{"id":7,"namespace":4,"title":"About","touched":"2023-05-01T00:00:00Z","noindex":true}"#;
        let record: Record = serde_json::from_str(line).unwrap();
        assert_eq!(record.partition, PartitionId(4));
        assert!(record.excluded);
        assert!(!record.redirect);
        assert!(record.variants.is_none());
    }
}

//! Worst-case size margins per partition.

use crate::urls::{UrlScheme, longest_title};
use crate::{PartitionId, format, iso8601};
use chrono::{DateTime, Utc};

/// Byte lengths used to pre-check the size ceiling before each write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMargins {
    /// Length of the chunk header.
    pub open: usize,
    /// Length of the largest entry the partition can produce.
    pub entry: usize,
    /// Length of the chunk footer.
    pub close: usize,
}

impl SizeMargins {
    /// Compute margins for `partition` using its longest possible URL.
    ///
    /// Variant URLs are measured too, since they can outgrow the canonical
    /// form (query-string variants add `index.php?title=` and `&variant=`).
    #[must_use]
    pub fn for_partition(
        scheme: &UrlScheme,
        partition: PartitionId,
        priority: &str,
        variants: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let title = longest_title();
        let lastmod = iso8601(now);
        let entry_len = |url: &str| format::file_entry(url, &lastmod, priority).len();

        let canonical = entry_len(&scheme.canonical_url(partition, &title));
        let entry = variants
            .iter()
            .map(|code| entry_len(&scheme.variant_url(partition, &title, code)))
            .fold(canonical, usize::max);

        Self {
            open: format::open_file().len(),
            entry,
            close: format::close_file().len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::GeneratorConfig;
    use chrono::TimeZone;

    fn scheme() -> UrlScheme {
        let mut config = GeneratorConfig::default();
        config.site.server = "https://wiki.example.org".into();
        config.site.namespaces.insert("4".into(), "Project".into());
        UrlScheme::from_config(&config).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_margins_cover_wrappers() {
        let margins = SizeMargins::for_partition(&scheme(), PartitionId(0), "1.0", &[], now());
        assert_eq!(margins.open, format::open_file().len());
        assert_eq!(margins.close, format::close_file().len());
    }

    #[test]
    fn test_entry_margin_exceeds_real_entries() {
        let scheme = scheme();
        let margins = SizeMargins::for_partition(&scheme, PartitionId(0), "1.0", &[], now());
        let real = format::file_entry(
            &scheme.canonical_url(PartitionId(0), "Some_fairly_long_page_title_(disambiguation)"),
            "2020-02-02T02:02:02Z",
            "1.0",
        );
        assert!(margins.entry > real.len());
        // 255 bytes of multi-byte title percent-encode to three bytes each
        assert!(margins.entry > 255 * 3);
    }

    #[test]
    fn test_prefix_and_variants_grow_margin() {
        let scheme = scheme();
        let main = SizeMargins::for_partition(&scheme, PartitionId(0), "0.5", &[], now());
        let project = SizeMargins::for_partition(&scheme, PartitionId(4), "0.5", &[], now());
        assert_eq!(project.entry, main.entry + "Project:".len());

        let variants = vec!["zh-hans".to_string()];
        let with_variants =
            SizeMargins::for_partition(&scheme, PartitionId(0), "0.5", &variants, now());
        assert!(with_variants.entry > main.entry);
    }
}

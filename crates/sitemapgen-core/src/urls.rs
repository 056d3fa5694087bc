//! Canonical URL construction for records.

use crate::{Error, GeneratorConfig, PartitionId, Result};
use std::collections::BTreeMap;
use url::Url;

/// Title used to size the longest URL a partition can produce: 63 four-byte
/// characters plus one three-byte character, 255 bytes in total.
pub fn longest_title() -> String {
    let mut title = "\u{28B81}".repeat(63);
    title.push('\u{5583}');
    title
}

/// Characters form-encoding escapes that wiki URLs keep literal.
const RESTORED: &[(&str, &str)] = &[
    ("%3B", ";"),
    ("%40", "@"),
    ("%24", "$"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%2C", ","),
    ("%2F", "/"),
    ("%7E", "~"),
    ("%3A", ":"),
];

/// Percent-encode a full page title for use in a path.
#[must_use]
pub fn encode_title(title: &str) -> String {
    let mut encoded: String = url::form_urlencoded::byte_serialize(title.as_bytes()).collect();
    for (escaped, literal) in RESTORED {
        encoded = encoded.replace(escaped, literal);
    }
    encoded
}

/// Renders canonical and variant URLs from site settings.
#[derive(Debug, Clone)]
pub struct UrlScheme {
    server: String,
    article_path: String,
    script_path: String,
    variant_article_path: Option<String>,
    namespaces: BTreeMap<PartitionId, String>,
}

impl UrlScheme {
    /// Build from configuration; the server must be an absolute http(s) URL.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let parsed = Url::parse(&config.site.server)
            .map_err(|e| Error::Config(format!("site.server is not a URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "site.server must be http or https: {}",
                config.site.server
            )));
        }
        Ok(Self {
            server: config.site.server.trim_end_matches('/').to_string(),
            article_path: config.site.article_path.clone(),
            script_path: config.site.script_path.trim_end_matches('/').to_string(),
            variant_article_path: config.site.variant_article_path.clone(),
            namespaces: config.namespace_names()?,
        })
    }

    /// `Prefix:Title`, or just `Title` for partitions without a prefix.
    #[must_use]
    pub fn full_title(&self, partition: PartitionId, title: &str) -> String {
        match self.namespaces.get(&partition) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{title}"),
            _ => title.to_string(),
        }
    }

    /// Human label for diagnostics.
    #[must_use]
    pub fn label(&self, partition: PartitionId) -> String {
        match self.namespaces.get(&partition) {
            Some(prefix) if !prefix.is_empty() => prefix.clone(),
            _ if partition.0 == 0 => "(Main)".to_string(),
            _ => format!("Namespace {partition}"),
        }
    }

    /// Canonical URL of a page.
    #[must_use]
    pub fn canonical_url(&self, partition: PartitionId, title: &str) -> String {
        let encoded = encode_title(&self.full_title(partition, title));
        format!("{}{}", self.server, self.article_path.replace("$1", &encoded))
    }

    /// URL of a page rendered under a locale variant.
    #[must_use]
    pub fn variant_url(&self, partition: PartitionId, title: &str, variant: &str) -> String {
        let encoded = encode_title(&self.full_title(partition, title));
        match &self.variant_article_path {
            Some(path) => format!(
                "{}{}",
                self.server,
                path.replace("$2", &encode_title(variant)).replace("$1", &encoded)
            ),
            None => {
                let variant: String =
                    url::form_urlencoded::byte_serialize(variant.as_bytes()).collect();
                format!(
                    "{}{}/index.php?title={encoded}&variant={variant}",
                    self.server, self.script_path
                )
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scheme(variant_path: Option<&str>) -> UrlScheme {
        let mut config = GeneratorConfig::default();
        config.site.server = "https://wiki.example.org/".into();
        config.site.namespaces.insert("1".into(), "Talk".into());
        config.site.variant_article_path = variant_path.map(str::to_string);
        UrlScheme::from_config(&config).unwrap()
    }

    #[test]
    fn test_longest_title_is_255_bytes() {
        assert_eq!(longest_title().len(), 255);
        assert_eq!(longest_title().chars().count(), 64);
    }

    #[test]
    fn test_encode_title_keeps_wiki_punctuation() {
        assert_eq!(encode_title("Foo/Bar:(baz)"), "Foo/Bar:(baz)");
        assert_eq!(encode_title("A&B"), "A%26B");
        assert_eq!(encode_title("Ä"), "%C3%84");
        assert_eq!(encode_title("a?b#c"), "a%3Fb%23c");
    }

    #[test]
    fn test_canonical_url_with_namespace_prefix() {
        let scheme = scheme(None);
        assert_eq!(
            scheme.canonical_url(PartitionId(0), "Main_Page"),
            "https://wiki.example.org/wiki/Main_Page"
        );
        assert_eq!(
            scheme.canonical_url(PartitionId(1), "Main_Page"),
            "https://wiki.example.org/wiki/Talk:Main_Page"
        );
    }

    #[test]
    fn test_variant_url_forms() {
        assert_eq!(
            scheme(None).variant_url(PartitionId(0), "Page", "zh-hans"),
            "https://wiki.example.org/w/index.php?title=Page&variant=zh-hans"
        );
        assert_eq!(
            scheme(Some("/$2/$1")).variant_url(PartitionId(0), "Page", "zh-hans"),
            "https://wiki.example.org/zh-hans/Page"
        );
    }

    #[test]
    fn test_labels() {
        let scheme = scheme(None);
        assert_eq!(scheme.label(PartitionId(0)), "(Main)");
        assert_eq!(scheme.label(PartitionId(1)), "Talk");
        assert_eq!(scheme.label(PartitionId(4)), "Namespace 4");
    }

    #[test]
    fn test_rejects_non_http_server() {
        let mut config = GeneratorConfig::default();
        config.site.server = "ftp://example.org".into();
        assert!(UrlScheme::from_config(&config).is_err());
        config.site.server = "not a url".into();
        assert!(UrlScheme::from_config(&config).is_err());
    }
}

//! Configuration for a sitemap generation run.
//!
//! Configuration is stored in TOML and resolved once, before generation begins.
//! The resulting [`GeneratorConfig`] is treated as immutable for the whole run.
//!
//! ## Configuration Sources
//!
//! 1. **Explicit file**: passed with `--config`
//! 2. **Default file**: `sitemapgen.toml` in the platform config directory
//! 3. **Built-in defaults**: used when neither exists
//! 4. **Environment**: `SITEMAPGEN_SCRATCH_ROOT` overrides `output.scratch_root`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [site]
//! id = "examplewiki"
//! server = "https://wiki.example.org"
//! article_path = "/wiki/$1"
//!
//! [site.namespaces]
//! "1" = "Talk"
//! "4" = "Project"
//!
//! [limits]
//! max_entries = 50000
//! max_bytes = 10485760
//!
//! [output]
//! compress = true
//! skip_redirects = true
//!
//! [partitions.robot_policies]
//! "2" = "noindex,nofollow"
//!
//! [priorities]
//! "0" = "1.0"
//! "14" = "0.7"
//!
//! [locale]
//! default = "zh"
//! variants = ["zh", "zh-hans", "zh-hant"]
//!
//! [storage]
//! root = "/srv/wiki/images"
//! prefix = "sitemaps"
//! ```

use crate::{Error, PartitionId, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the scratch root.
pub const SCRATCH_ROOT_ENV: &str = "SITEMAPGEN_SCRATCH_ROOT";

/// Maximum URLs per sitemap file, per the sitemaps.org schema.
pub const DEFAULT_MAX_ENTRIES: usize = 50_000;

/// Maximum uncompressed sitemap file size (10 MiB).
pub const DEFAULT_MAX_BYTES: usize = 10 * (1 << 20);

/// Complete configuration for one generator invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Site identity and URL layout
    pub site: SiteConfig,
    /// Per-file ceilings
    pub limits: LimitsConfig,
    /// Output naming, scratch location and run flags
    pub output: OutputConfig,
    /// Which partitions take part in the run
    pub partitions: PartitionsConfig,
    /// Partition → priority overrides (keys are decimal partition ids)
    pub priorities: BTreeMap<String, String>,
    /// Locale variant settings
    pub locale: LocaleConfig,
    /// Storage backend destination
    pub storage: StorageConfig,
}

/// Site identity and canonical URL layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Identifier used to name the scratch directory.
    pub id: String,
    /// Canonical server, scheme included, no trailing slash.
    pub server: String,
    /// Article path with `$1` standing for the encoded title.
    pub article_path: String,
    /// Script path used for variant URLs when no variant article path exists.
    pub script_path: String,
    /// Optional variant path, `$1` = title, `$2` = variant code.
    pub variant_article_path: Option<String>,
    /// Partition → title prefix (e.g. `"1" = "Talk"`).
    pub namespaces: BTreeMap<String, String>,
}

/// Ceilings applied to every chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum entries per chunk.
    pub max_entries: usize,
    /// Maximum uncompressed bytes per chunk.
    pub max_bytes: usize,
}

/// Output naming and run flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Public URL prefix prepended to filenames in the index.
    /// Defaults to `{server}/images/sitemaps/`.
    pub url_prefix: Option<String>,
    /// Directory under which the scratch directory is created.
    /// Defaults to the system temp dir.
    pub scratch_root: Option<PathBuf>,
    /// Chunk filename prefix, followed by `{partition}-{sequence}.xml`.
    pub file_prefix: String,
    /// Name of the index file.
    pub index_name: String,
    /// Gzip chunk files.
    pub compress: bool,
    /// Leave redirect records out of the sitemap.
    pub skip_redirects: bool,
}

/// Partition selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionsConfig {
    /// Explicit partitions; when set, discovery is skipped.
    pub include: Option<Vec<i32>>,
    /// Partition → robots policy; `noindex` policies drop discovered partitions.
    pub robot_policies: BTreeMap<String, String>,
}

/// Locale variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// The site's content language; never emitted as a variant.
    pub default: String,
    /// Variants every record renders under unless the record says otherwise.
    pub variants: Vec<String>,
}

/// Storage backend destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the local path-addressed backend.
    pub root: PathBuf,
    /// Destination directory under the backend root.
    pub prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            id: "wiki".to_string(),
            server: "http://localhost".to_string(),
            article_path: "/wiki/$1".to_string(),
            script_path: "/w".to_string(),
            variant_article_path: None,
            namespaces: BTreeMap::new(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            url_prefix: None,
            scratch_root: None,
            file_prefix: "NS_".to_string(),
            index_name: "index.xml".to_string(),
            compress: true,
            skip_redirects: true,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: "en".to_string(),
            variants: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
            prefix: "sitemaps".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load from the platform config directory, or fall back to defaults.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading default config");
                Self::load(&path)
            },
            _ => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            },
        }
    }

    /// Parse configuration from TOML text and apply environment overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Location of `sitemapgen.toml` in the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "outfitter", "sitemapgen")
            .map(|dirs| dirs.config_dir().join("sitemapgen.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(SCRATCH_ROOT_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                self.output.scratch_root = Some(PathBuf::from(trimmed));
            }
        }
    }

    /// Check limits, partition keys and priority values.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_entries == 0 {
            return Err(Error::Config("limits.max_entries must be positive".into()));
        }
        if self.limits.max_bytes == 0 {
            return Err(Error::Config("limits.max_bytes must be positive".into()));
        }
        if self.site.id.is_empty()
            || !self
                .site
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            return Err(Error::Config(format!(
                "site.id must be non-empty and contain only [A-Za-z0-9_-]: {:?}",
                self.site.id
            )));
        }
        if !self.site.article_path.contains("$1") {
            return Err(Error::Config("site.article_path must contain $1".into()));
        }
        if let Some(include) = &self.partitions.include {
            let mut seen = BTreeSet::new();
            if let Some(dup) = include.iter().find(|id| !seen.insert(**id)) {
                return Err(Error::Config(format!(
                    "partitions.include lists partition {dup} more than once"
                )));
            }
        }
        self.namespace_names()?;
        self.robot_policies()?;
        for (key, value) in &self.priorities {
            key.parse::<PartitionId>()?;
            if value.trim().parse::<f64>().is_err() {
                return Err(Error::Config(format!(
                    "priority for partition {key} is not a number: {value:?}"
                )));
            }
        }
        Ok(())
    }

    /// Partition → title prefix, keyed by parsed partition id.
    pub fn namespace_names(&self) -> Result<BTreeMap<PartitionId, String>> {
        parse_keys(&self.site.namespaces)
    }

    /// Partition → robots policy, keyed by parsed partition id.
    pub fn robot_policies(&self) -> Result<BTreeMap<PartitionId, String>> {
        parse_keys(&self.partitions.robot_policies)
    }

    /// Public URL prefix for chunk files, always ending in `/`.
    #[must_use]
    pub fn url_prefix(&self) -> String {
        let prefix = self.output.url_prefix.clone().unwrap_or_else(|| {
            format!("{}/images/sitemaps/", self.site.server.trim_end_matches('/'))
        });
        if prefix.ends_with('/') {
            prefix
        } else {
            format!("{prefix}/")
        }
    }

    /// Directory the scratch directory is created under.
    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        self.output
            .scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn parse_keys(map: &BTreeMap<String, String>) -> Result<BTreeMap<PartitionId, String>> {
    map.iter()
        .map(|(key, value)| Ok((key.parse::<PartitionId>()?, value.clone())))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_sitemap_protocol() {
        let config = GeneratorConfig::default();
        assert_eq!(config.limits.max_entries, 50_000);
        assert_eq!(config.limits.max_bytes, 10_485_760);
        assert!(config.output.compress);
        assert!(config.output.skip_redirects);
        assert_eq!(config.output.index_name, "index.xml");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_file() {
        let config = GeneratorConfig::from_toml(
            r#"
            [site]
            id = "examplewiki"
            server = "https://wiki.example.org"

            [site.namespaces]
            "1" = "Talk"

            [limits]
            max_entries = 10

            [output]
            compress = false

            [partitions]
            include = [0, 4]

            [priorities]
            "4" = "0.9"

            [locale]
            default = "zh"
            variants = ["zh", "zh-hans"]
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_entries, 10);
        assert_eq!(config.limits.max_bytes, DEFAULT_MAX_BYTES);
        assert!(!config.output.compress);
        assert!(config.output.skip_redirects);
        assert_eq!(config.partitions.include, Some(vec![0, 4]));
        assert_eq!(
            config.namespace_names().unwrap().get(&PartitionId(1)).map(String::as_str),
            Some("Talk")
        );
        assert_eq!(config.url_prefix(), "https://wiki.example.org/images/sitemaps/");
    }

    #[test]
    fn test_rejects_zero_limits() {
        let err = GeneratorConfig::from_toml("[limits]\nmax_entries = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = GeneratorConfig::from_toml("[limits]\nmax_bytes = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_bad_keys_and_priorities() {
        let err = GeneratorConfig::from_toml("[priorities]\nmain = \"1.0\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid partition id"));

        let err = GeneratorConfig::from_toml("[priorities]\n\"0\" = \"high\"\n").unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_rejects_repeated_included_partition() {
        let err = GeneratorConfig::from_toml("[partitions]\ninclude = [0, 4, 0]\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("partition 0 more than once"));

        let config = GeneratorConfig::from_toml("[partitions]\ninclude = [4, 0]\n").unwrap();
        assert_eq!(config.partitions.include, Some(vec![4, 0]));
    }

    #[test]
    fn test_rejects_unsafe_site_id() {
        let err = GeneratorConfig::from_toml("[site]\nid = \"../etc\"\n").unwrap_err();
        assert!(err.to_string().contains("site.id"));
    }

    #[test]
    fn test_url_prefix_gets_trailing_slash() {
        let mut config = GeneratorConfig::default();
        config.output.url_prefix = Some("https://cdn.example.org/maps".into());
        assert_eq!(config.url_prefix(), "https://cdn.example.org/maps/");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitemapgen.toml");
        fs::write(&path, "[site]\nid = \"w1\"\n").unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.site.id, "w1");

        let missing = GeneratorConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, Error::Config(_)));
    }

    proptest! {
        #[test]
        fn test_limits_roundtrip(max_entries in 1usize..=50_000, max_bytes in 1usize..=(1 << 26)) {
            let mut config = GeneratorConfig::default();
            config.limits = LimitsConfig { max_entries, max_bytes };

            let serialized = toml::to_string_pretty(&config).unwrap();
            let parsed: GeneratorConfig = toml::from_str(&serialized).unwrap();

            prop_assert_eq!(parsed.limits.max_entries, max_entries);
            prop_assert_eq!(parsed.limits.max_bytes, max_bytes);
        }
    }
}

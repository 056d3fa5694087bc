#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a `sitemapgen` command isolated from the caller's environment.
pub fn sitemapgen_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitemapgen"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("SITEMAPGEN_CONFIG");
    cmd.env_remove("SITEMAPGEN_SCRATCH_ROOT");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Temporary site: config file, catalog, scratch root and storage root.
pub struct Site {
    pub dir: TempDir,
    pub config: PathBuf,
    pub catalog: PathBuf,
}

impl Site {
    /// Build a site whose config appends `extra` TOML after the base sections.
    pub fn new(extra: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let storage = dir.path().join("storage");
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();

        let config = dir.path().join("sitemapgen.toml");
        fs::write(
            &config,
            format!(
                r#"[site]
id = "testwiki"
server = "https://wiki.example.org"

[site.namespaces]
"1" = "Talk"
"4" = "Project"

[output]
scratch_root = {scratch:?}
compress = false

[storage]
root = {storage:?}
{extra}
"#
            ),
        )
        .unwrap();

        let catalog = dir.path().join("catalog.jsonl");
        Self {
            dir,
            config,
            catalog,
        }
    }

    pub fn write_catalog(&self, lines: &[&str]) {
        fs::write(&self.catalog, lines.join("\n") + "\n").unwrap();
    }

    pub fn uploaded(&self) -> PathBuf {
        self.dir.path().join("storage").join("sitemaps")
    }

    pub fn scratch(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = sitemapgen_cmd();
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

/// One catalog line.
pub fn record(id: u64, namespace: i32, title: &str) -> String {
    format!(
        r#"{{"id":{id},"namespace":{namespace},"title":"{title}","touched":"2024-01-15T10:30:00Z"}}"#
    )
}

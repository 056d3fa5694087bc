//! # CLI Structure and Argument Parsing
//!
//! The command-line interface for `sitemapgen`, built with `clap` derive macros.
//!
//! ```bash
//! # Generate from a catalog and upload to the configured storage root
//! sitemapgen --config site.toml generate --catalog pages.jsonl
//!
//! # Write uncompressed files locally instead of uploading
//! sitemapgen generate --catalog pages.jsonl --compress no --out-dir ./out
//!
//! # Check a generated directory
//! sitemapgen verify ./out --format json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `sitemapgen` command
#[derive(Parser, Clone, Debug)]
#[command(name = "sitemapgen")]
#[command(version)]
#[command(about = "Chunked sitemap generation for large content catalogs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SITEMAPGEN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate the sitemap file set from a JSON Lines catalog
    Generate {
        /// Catalog file with one record per line
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,

        /// Gzip chunk files (overrides `output.compress`)
        #[arg(long, value_enum, value_name = "yes|no")]
        compress: Option<YesNo>,

        /// Leave redirect records out (overrides `output.skip_redirects`)
        #[arg(long, value_enum, value_name = "yes|no")]
        skip_redirects: Option<YesNo>,

        /// Write into this directory and skip the upload step
        ///
        /// Index and chunk files from an earlier run in the directory are removed first.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check a generated directory against the chunk limits
    Verify {
        /// Directory holding the index and chunk files
        dir: PathBuf,

        /// Maximum entries per chunk (defaults to `limits.max_entries`)
        #[arg(long)]
        max_entries: Option<usize>,

        /// Maximum uncompressed bytes per chunk (defaults to `limits.max_bytes`)
        #[arg(long)]
        max_bytes: Option<usize>,

        /// Index file name (defaults to `output.index_name`)
        #[arg(long)]
        index_name: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl Commands {
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Generate { format, .. } | Self::Verify { format, .. } => *format,
        }
    }
}

/// Boolean flag spelled the way operators write it in cron lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        matches!(value, YesNo::Yes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "sitemapgen",
            "generate",
            "--catalog",
            "pages.jsonl",
            "--compress",
            "no",
            "--skip-redirects",
            "yes",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                compress,
                skip_redirects,
                format,
                ..
            } => {
                assert_eq!(compress, Some(YesNo::No));
                assert_eq!(skip_redirects, Some(YesNo::Yes));
                assert_eq!(format, OutputFormat::Text);
            },
            Commands::Verify { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_yes_no_rejects_other_values() {
        let result =
            Cli::try_parse_from(["sitemapgen", "generate", "--catalog", "x", "--compress", "true"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["sitemapgen", "-v", "-q", "verify", "out"]);
        assert!(result.is_err());
    }
}

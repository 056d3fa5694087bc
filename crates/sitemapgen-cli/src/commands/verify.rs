//! Verify command implementation

use anyhow::{Result, bail};
use colored::Colorize;
use sitemapgen_core::verify::{VerifyReport, verify_dir};
use sitemapgen_core::{GeneratorConfig, LimitsConfig};
use std::path::Path;

use crate::output::{OutputFormat, print_json};

/// Limits and index name to check against; unset values fall back to config.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub max_entries: Option<usize>,
    pub max_bytes: Option<usize>,
    pub index_name: Option<String>,
}

/// Execute the verify command
///
/// Fails when the directory has any problem, after printing the report.
pub fn execute(
    config: &GeneratorConfig,
    dir: &Path,
    options: VerifyOptions,
    format: OutputFormat,
) -> Result<()> {
    let limits = LimitsConfig {
        max_entries: options.max_entries.unwrap_or(config.limits.max_entries),
        max_bytes: options.max_bytes.unwrap_or(config.limits.max_bytes),
    };
    let index_name = options
        .index_name
        .unwrap_or_else(|| config.output.index_name.clone());

    let report = verify_dir(dir, &index_name, limits)?;

    match format {
        OutputFormat::Text => print_text(&report, limits),
        OutputFormat::Json => print_json(&report)?,
    }

    if !report.is_ok() {
        bail!("{} problem(s) found in {}", report.problems.len(), dir.display());
    }
    Ok(())
}

fn print_text(report: &VerifyReport, limits: LimitsConfig) {
    for chunk in &report.chunks {
        println!(
            "{:<24} {:>7} entries {:>10} bytes",
            chunk.filename, chunk.entries, chunk.bytes
        );
    }
    println!(
        "{}",
        format!(
            "{} indexed chunk(s), limits {} entries / {} bytes",
            report.index.len(),
            limits.max_entries,
            limits.max_bytes
        )
        .dimmed()
    );

    if report.is_ok() {
        println!("{} No problems found", "✓".green());
    } else {
        for problem in &report.problems {
            println!("{} {problem}", "✗".red());
        }
    }
}

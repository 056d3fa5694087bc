//! Generate command implementation

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::Colorize;
use sitemapgen_core::scratch::remove_stale_output;
use sitemapgen_core::{
    BatchOutcome, GeneratorConfig, JsonLinesSource, LocalFsBackend, RunReport, SitemapGenerator,
};
use std::path::Path;

use crate::cli::YesNo;
use crate::output::{OutputFormat, print_json};

/// Flags that override the loaded configuration for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub compress: Option<YesNo>,
    pub skip_redirects: Option<YesNo>,
}

impl Overrides {
    fn apply(self, config: &mut GeneratorConfig) {
        if let Some(flag) = self.compress {
            config.output.compress = flag.into();
        }
        if let Some(flag) = self.skip_redirects {
            config.output.skip_redirects = flag.into();
        }
    }
}

/// Execute the generate command
///
/// Fails when any upload operation failed, after printing the report.
pub fn execute(
    mut config: GeneratorConfig,
    catalog: &Path,
    overrides: Overrides,
    out_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    overrides.apply(&mut config);

    let source = JsonLinesSource::open(catalog, config.locale.variants.clone())
        .with_context(|| format!("Failed to open catalog {}", catalog.display()))?;
    let backend = LocalFsBackend::new(&config.storage.root);
    let generator = SitemapGenerator::new(config)?;

    let report = match out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            remove_stale_output(dir, &generator.config().output)
                .with_context(|| format!("Failed to clear previous output in {}", dir.display()))?;
            generator.generate_into(&source, dir, Utc::now())?
        },
        None => generator.run(&source, &backend)?,
    };

    match format {
        OutputFormat::Text => print_text(&report, out_dir),
        OutputFormat::Json => print_json(&report)?,
    }

    if let Some(outcome) = report.upload.as_ref().filter(|o| !o.is_ok()) {
        bail!(
            "{} of {} uploads failed",
            outcome.failed.len(),
            outcome.failed.len() + outcome.stored.len()
        );
    }
    Ok(())
}

fn print_text(report: &RunReport, out_dir: Option<&Path>) {
    for partition in &report.partitions {
        println!(
            "{} {} (priority {})",
            partition.label.green().bold(),
            format!("[{}]", partition.partition).dimmed(),
            partition.priority
        );
        println!(
            "  {} records, {} entries in {} file(s)",
            partition.records,
            partition.entries,
            partition.files.len()
        );
        let mut skipped = format!("  skipped {} excluded", partition.skipped_excluded);
        if let Some(redirects) = partition.skipped_redirects {
            skipped.push_str(&format!(", {redirects} redirects"));
        }
        println!("{}", skipped.dimmed());
    }

    println!();
    println!(
        "Wrote {} chunk file(s) with {} entries",
        report.chunks.len().to_string().bold(),
        report.total_entries().to_string().bold()
    );
    if let Some(dir) = out_dir {
        println!("Output: {}", dir.display());
    }
    if let Some(outcome) = &report.upload {
        print_upload(outcome);
    }
}

fn print_upload(outcome: &BatchOutcome) {
    if outcome.is_ok() {
        println!("{} Uploaded {} file(s)", "✓".green(), outcome.stored.len());
        return;
    }
    println!(
        "{} Uploaded {} file(s), {} failed",
        "✗".red(),
        outcome.stored.len(),
        outcome.failed.len()
    );
    for failed in &outcome.failed {
        println!("  {} {}: {}", "-".red(), failed.op.dst, failed.reason);
    }
}

//! Shared CLI helpers.

pub mod logging;

use anyhow::{Context, Result};
use sitemapgen_core::GeneratorConfig;
use std::path::Path;

/// Load the explicit config file, or the platform default.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => GeneratorConfig::load_default().context("Failed to load default config"),
    }
}

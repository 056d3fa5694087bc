//! sitemapgen CLI - chunked sitemap generation for large content catalogs
//!
//! This is the main entry point for the sitemapgen command-line interface.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli)
}

fn execute_command(cli: Cli) -> Result<()> {
    let config = utils::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            catalog,
            compress,
            skip_redirects,
            out_dir,
            format,
        } => {
            let overrides = commands::Overrides {
                compress,
                skip_redirects,
            };
            commands::generate(config, &catalog, overrides, out_dir.as_deref(), format)?;
        },

        Commands::Verify {
            dir,
            max_entries,
            max_bytes,
            index_name,
            format,
        } => {
            let options = commands::VerifyOptions {
                max_entries,
                max_bytes,
                index_name,
            };
            commands::verify(&config, &dir, options, format)?;
        },
    }

    Ok(())
}

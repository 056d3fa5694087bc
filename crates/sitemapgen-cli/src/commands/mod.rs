//! Command implementations for the sitemapgen CLI

mod generate;
mod verify;

pub use generate::{Overrides, execute as generate};
pub use verify::{VerifyOptions, execute as verify};

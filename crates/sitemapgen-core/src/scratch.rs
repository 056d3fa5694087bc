//! Run-scoped scratch directory.

use crate::{Error, OutputConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scratch directory removed when dropped, on success and failure alike.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `{root}/sitemapgen-{site_id}`, clearing leftovers of an aborted run.
    pub fn create(root: &Path, site_id: &str) -> Result<Self> {
        let path = root.join(format!("sitemapgen-{site_id}"));
        if path.exists() {
            debug!(path = %path.display(), "Removing stale scratch directory");
            fs::remove_dir_all(&path).map_err(|e| scratch_error(&path, &e))?;
        }
        fs::create_dir_all(&path).map_err(|e| scratch_error(&path, &e))?;
        Ok(Self { path })
    }

    /// Directory the run writes into.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn scratch_error(path: &Path, e: &std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("could not create scratch directory {}: {e}", path.display()),
    ))
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove scratch directory"),
        }
    }
}

/// Delete index and chunk files a previous run left in `dir`.
///
/// Only files named like this run's output are touched: the index name and
/// `{file_prefix}*.xml` or `{file_prefix}*.xml.gz`. Returns how many were removed.
pub fn remove_stale_output(dir: &Path, output: &OutputConfig) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let chunk = name.starts_with(&output.file_prefix)
            && (name.ends_with(".xml") || name.ends_with(".xml.gz"));
        if chunk || name == output.index_name {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(dir = %dir.display(), removed, "Removed previous sitemap output");
    }
    Ok(removed)
}

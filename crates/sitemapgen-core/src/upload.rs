//! Handing the finished file set to a storage backend.
//!
//! The uploader walks the scratch directory, builds one store operation per
//! regular file (keeping its base name) and submits them as a single batch.
//! Partial failure of the batch is reported back unchanged; retries are the
//! backend's business.

use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Store a local file at a backend destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreOp {
    /// Local file to store.
    pub src: PathBuf,
    /// Backend destination path.
    pub dst: String,
}

/// An operation the backend could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedOp {
    /// Operation that failed.
    pub op: StoreOp,
    /// Backend's description of the failure.
    pub reason: String,
}

/// Result of a batch submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Destinations stored successfully.
    pub stored: Vec<String>,
    /// Operations the backend could not complete.
    pub failed: Vec<FailedOp>,
}

impl BatchOutcome {
    /// True when no operation failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Path-addressed storage backend contract.
pub trait FileBackend {
    /// Root path destinations are built under (e.g. `mwstore://backend/container`).
    fn root_storage_path(&self) -> String;

    /// Make sure a destination directory can receive files.
    fn prepare(&self, dir: &str) -> Result<()>;

    /// Run a batch of store operations. Per-operation failures go into the
    /// outcome; an `Err` means the batch as a whole could not be attempted.
    fn do_quick_operations(&self, ops: &[StoreOp]) -> Result<BatchOutcome>;
}

/// Ships a generated file tree to a [`FileBackend`].
pub struct StorageUploader<'a> {
    backend: &'a dyn FileBackend,
    prefix: String,
}

impl<'a> StorageUploader<'a> {
    /// Uploader storing under `{root}/{prefix}/`; slashes around `prefix` are trimmed.
    pub fn new(backend: &'a dyn FileBackend, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Destination directory, `{root}/{prefix}/`.
    #[must_use]
    pub fn destination_dir(&self) -> String {
        format!(
            "{}/{}/",
            self.backend.root_storage_path().trim_end_matches('/'),
            self.prefix
        )
    }

    /// Build one store operation per regular file under `dir`, sorted by destination.
    pub fn plan(&self, dir: &Path) -> Result<Vec<StoreOp>> {
        let dest = self.destination_dir();
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;

        let mut ops: Vec<StoreOp> = files
            .into_iter()
            .filter_map(|src| {
                let name = src.file_name()?.to_string_lossy().into_owned();
                Some(StoreOp {
                    dst: format!("{dest}{name}"),
                    src,
                })
            })
            .collect();
        ops.sort_by(|a, b| a.dst.cmp(&b.dst));
        Ok(ops)
    }

    /// Plan and submit the batch for `dir`.
    pub fn upload(&self, dir: &Path) -> Result<BatchOutcome> {
        let ops = self.plan(dir)?;
        if ops.is_empty() {
            return Ok(BatchOutcome::default());
        }
        self.backend.prepare(&self.destination_dir())?;
        let outcome = self.backend.do_quick_operations(&ops)?;

        info!(
            stored = outcome.stored.len(),
            failed = outcome.failed.len(),
            destination = %self.destination_dir(),
            "Submitted store batch"
        );
        for failure in &outcome.failed {
            warn!(dst = %failure.op.dst, reason = %failure.reason, "Store operation failed");
        }
        Ok(outcome)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), out)?;
        } else if file_type.is_file() {
            out.push(entry.path());
        }
    }
    Ok(())
}

/// Backend storing into a local directory tree.
///
/// Destination paths take the form `{root_name}/{prefix}/{file}` and map to
/// `{root}/{prefix}/{file}` on disk.
#[derive(Debug, Clone)]
pub struct LocalFsBackend {
    root: PathBuf,
    name: String,
}

impl LocalFsBackend {
    /// Backend rooted at `root`, addressed as `local-backend`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: "local-backend".to_string(),
        }
    }

    /// Local directory backing the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, storage_path: &str) -> Result<PathBuf> {
        let relative = storage_path
            .strip_prefix(&self.root_storage_path())
            .ok_or_else(|| Error::storage(format!("path outside backend: {storage_path}")))?
            .trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            return Err(Error::storage(format!("path escapes backend root: {storage_path}")));
        }
        Ok(self.root.join(relative))
    }
}

impl FileBackend for LocalFsBackend {
    fn root_storage_path(&self) -> String {
        format!("{}/", self.name)
    }

    fn prepare(&self, dir: &str) -> Result<()> {
        let path = self.resolve(dir)?;
        fs::create_dir_all(&path)
            .map_err(|e| Error::storage(format!("Failed to prepare {}: {e}", path.display())))
    }

    fn do_quick_operations(&self, ops: &[StoreOp]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for op in ops {
            let result = self.resolve(&op.dst).and_then(|target| {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&op.src, &target)?;
                Ok(())
            });
            match result {
                Ok(()) => outcome.stored.push(op.dst.clone()),
                Err(e) => outcome.failed.push(FailedOp {
                    op: op.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        Ok(outcome)
    }
}

//! Error types and handling for sitemapgen-core operations.
//!
//! A single error type covers every failure a generation run can hit. Errors are
//! categorized for logging and carry a recoverability hint so callers can decide
//! whether a retry of the whole run is worthwhile.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: scratch directory creation, chunk and index streams
//! - **Configuration Errors**: malformed TOML, out-of-range limits, bad keys
//! - **Source Errors**: the record catalog could not be read or decoded
//! - **Stream Errors**: writes reaching a chunk that is not open
//! - **Storage Errors**: the backend rejected a batch or a store operation
//! - **Parse Errors**: generated XML could not be read back
//!
//! ## Recovery Hints
//!
//! ```rust
//! use sitemapgen_core::{Error, Result};
//!
//! fn handle(result: Result<()>) {
//!     match result {
//!         Err(e) if e.is_recoverable() => println!("transient failure, rerun: {e}"),
//!         Err(e) => println!("[{}] {e}", e.category()),
//!         Ok(()) => println!("done"),
//!     }
//! }
//! # handle(Ok(()));
//! ```

use thiserror::Error;

/// The main error type for sitemapgen-core operations.
///
/// All public functions return `Result<T, Error>`. Conversions from the
/// standard I/O error and the serialization crates are provided so `?` works
/// across module boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers opening, writing and closing chunk or index streams, and creating
    /// the scratch directory. Any of these aborts the run.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or inaccessible.
    ///
    /// ## Common Causes
    ///
    /// - Invalid TOML syntax in the config file
    /// - Zero entry or byte limits
    /// - Partition keys that are not integers
    /// - Priority values that are not numbers
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record source failed.
    ///
    /// Raised when the catalog cannot be opened or a line cannot be decoded.
    #[error("Source error: {0}")]
    Source(String),

    /// A chunk or index stream was used outside its open state.
    ///
    /// This is an invariant violation inside the writer and always fatal.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Storage backend operation failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure.
        message: String,
        /// Whether the backend reported the failure as transient.
        transient: bool,
    },

    /// Generated XML could not be parsed back.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl Error {
    /// Build a permanent storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            transient: false,
        }
    }

    /// Check if the error might go away when the run is repeated.
    ///
    /// Generation runs are not resumable, so "recoverable" here means a fresh
    /// run has a reasonable chance to succeed.
    ///
    /// ```rust
    /// use sitemapgen_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_recoverable());
    /// assert!(!Error::Config("max_entries must be positive".into()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            Self::Storage { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Get the error category as a string identifier for structured logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Source(_) => "source",
            Self::Stream(_) => "stream",
            Self::Storage { .. } => "storage",
            Self::Parse(_) => "parse",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

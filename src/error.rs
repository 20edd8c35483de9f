//! Error taxonomy for the loading pipeline.
//!
//! Two layers:
//! - [`TrackLoaderError`] aborts a pipeline call and is surfaced to the caller
//!   (bad directory, missing parser, systemic parser failure, broken record store).
//! - [`ParseError`] is what a single parser unit reports. Its `TrackLoad` variant is the
//!   per-file, recoverable kind: the orchestrator logs it and drops the file.

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::TrackFormat;

/// Errors that abort a pipeline invocation.
#[derive(Debug, Error)]
pub enum TrackLoaderError {
    /// Input path exists but is not a directory, or does not exist at all
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No parser registered for the requested format
    #[error("No parser registered for format: {0}")]
    MissingParser(TrackFormat),

    /// Filesystem error outside of a single track file (synced list, record export)
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A parser reported a failure that is not about the file's content
    #[error("Unrecoverable failure while loading {path}: {reason}")]
    Unrecoverable { path: PathBuf, reason: String },

    /// A worker unit panicked or was cancelled
    #[error("Load task failed: {0}")]
    Task(String),

    /// The activity record store could not be queried
    #[error("Record source error: {0}")]
    RecordSource(String),

    /// Configuration value could not be interpreted
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Per-file load failure: the file's content could not be turned into a track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TrackLoadError {
    pub reason: String,
}

impl TrackLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of a failed parser unit.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed file. Logged and skipped by the orchestrator.
    #[error("Track load error: {0}")]
    TrackLoad(#[from] TrackLoadError),

    /// Anything else (resource exhaustion, broken decoder). Aborts the batch.
    #[error("Unrecoverable parser error: {0}")]
    Unrecoverable(Box<dyn std::error::Error + Send + Sync>),
}

impl ParseError {
    /// Shorthand for a recoverable, per-file error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ParseError::TrackLoad(TrackLoadError::new(reason))
    }
}

pub type Result<T> = std::result::Result<T, TrackLoaderError>;

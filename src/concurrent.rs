//! Concurrent load orchestrator: fans parser units out to the blocking worker pool.
//!
//! # Behaviour
//! - Every file (or file pair) is one unit, scheduled with [`JoinSet::spawn_blocking`].
//! - Completions are collected as they arrive; the output map carries no order.
//! - [`ParseError::TrackLoad`] is logged with the file name and the unit is dropped; the
//!   batch carries on and siblings in flight are untouched.
//! - [`ParseError::Unrecoverable`], a panicking unit or a cancelled unit aborts the batch.
//! - The caller is blocked (awaits) until every unit has completed or the batch aborts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{ParseError, Result, TrackLoadError, TrackLoaderError};
use crate::parser::TrackParser;
use crate::reconcile::load_paired;
use crate::track::Track;

/// Result of one batch.
#[derive(Debug, Default)]
pub struct LoadBatch {
    /// One entry per successful unit, keyed by the unit's file (payload file for pairs).
    pub tracks: HashMap<PathBuf, Track>,
    /// Units that failed with a per-file load error.
    pub failed: Vec<(PathBuf, TrackLoadError)>,
}

impl LoadBatch {
    /// Tracks ordered by their unit's path, independent of completion order.
    pub fn into_tracks(self) -> Vec<Track> {
        let mut keyed: Vec<(PathBuf, Track)> = self.tracks.into_iter().collect();
        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        keyed.into_iter().map(|(_, track)| track).collect()
    }

    /// Folds another batch into this one.
    pub fn extend(&mut self, other: LoadBatch) {
        self.tracks.extend(other.tracks);
        self.failed.extend(other.failed);
    }
}

/// A metadata file and a payload file for the same activity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedFiles {
    pub metadata: PathBuf,
    pub payload: PathBuf,
}

/// Parses every path with `parser`.
pub async fn load_all(paths: Vec<PathBuf>, parser: Arc<dyn TrackParser>) -> Result<LoadBatch> {
    let units = paths.into_iter().map(|path| {
        let parser = Arc::clone(&parser);
        (path.clone(), move || parser.parse(&path))
    });
    run_units(units).await
}

/// Parses each pair with [`load_paired`]; results are keyed by the payload path.
pub async fn load_all_paired(
    pairs: Vec<PairedFiles>,
    metadata_parser: Arc<dyn TrackParser>,
    payload_parser: Arc<dyn TrackParser>,
) -> Result<LoadBatch> {
    let units = pairs.into_iter().map(|pair| {
        let metadata_parser = Arc::clone(&metadata_parser);
        let payload_parser = Arc::clone(&payload_parser);
        (pair.payload.clone(), move || {
            load_paired(
                metadata_parser.as_ref(),
                payload_parser.as_ref(),
                &pair.metadata,
                &pair.payload,
            )
        })
    });
    run_units(units).await
}

async fn run_units<I, F>(units: I) -> Result<LoadBatch>
where
    I: IntoIterator<Item = (PathBuf, F)>,
    F: FnOnce() -> std::result::Result<Track, ParseError> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (key, unit) in units {
        set.spawn_blocking(move || {
            let result = unit();
            (key, result)
        });
    }
    let submitted = set.len();
    debug!(submitted, "[LOAD] Submitted load units");

    let mut batch = LoadBatch {
        tracks: HashMap::with_capacity(submitted),
        failed: Vec::new(),
    };
    while let Some(joined) = set.join_next().await {
        let (path, result) = joined.map_err(|e| {
            error!(error = %e, "[LOAD][ERROR] Load unit panicked or was cancelled");
            TrackLoaderError::Task(e.to_string())
        })?;
        match result {
            Ok(track) => {
                batch.tracks.insert(path, track);
            }
            Err(ParseError::TrackLoad(e)) => {
                error!(file = %path.display(), reason = %e, "[LOAD] Error while loading file");
                batch.failed.push((path, e));
            }
            Err(ParseError::Unrecoverable(e)) => {
                error!(file = %path.display(), error = %e, "[LOAD][ERROR] Unrecoverable parser failure, aborting batch");
                return Err(TrackLoaderError::Unrecoverable {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        submitted,
        loaded = batch.tracks.len(),
        failed = batch.failed.len(),
        "[LOAD] Batch complete"
    );
    Ok(batch)
}

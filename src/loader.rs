//! High-level pipelines: scan → load → filter → merge → length cutoff.
//!
//! This module composes the building blocks into the three entry points callers use:
//!   - [`TrackLoader::load_tracks`]: one directory of one format
//!   - [`TrackLoader::load_tracks_reconciled`]: two directories holding the same activities
//!     in two formats (e.g. GPX titles + FIT recordings), reconciled by activity id
//!   - [`TrackLoader::load_tracks_from_db`]: already-parsed activity records
//!
//! # Major Types
//! - [`TrackLoader`]: holds the policy ([`LoaderConfig`]), the parser table and the
//!   synced-file provider
//! - [`LoadOutcome`]: the surviving tracks plus [`LoadStats`] for every stage
//!
//! # Responsibilities
//! - The synced-file list is read once per invocation and injected into the scanner
//! - Per-file parse failures reduce the output and are logged; they never fail the call
//! - Structural problems (bad directory, missing parser, systemic parser failure) return
//!   immediately with a [`TrackLoaderError`]
//!
//! # Output
//! Tracks come back sorted by start time, merged into sessions, with every track at
//! least `min_length` long.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::Serialize;
use tracing::{debug, info};

use crate::concurrent::{load_all, load_all_paired, LoadBatch, PairedFiles};
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::filter::filter_tracks;
use crate::merge::merge_tracks;
use crate::parser::{ParserRegistry, TrackFormat};
use crate::reconcile::{path_for, IdentityPartition};
use crate::records::{load_from_record, ActivityRecordSource, QueryMode};
use crate::scanner::DirectoryScanner;
use crate::synced::SyncedFileStore;
use crate::track::Track;

/// Counts observed at each pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Files found by the scanner, or records returned by the store.
    pub scanned: usize,
    /// Tracks produced by parsers (or records mapped).
    pub loaded: usize,
    /// Files dropped with a per-file load error.
    pub failed: usize,
    /// Tracks that passed the filter.
    pub filtered: usize,
    /// Tracks rejected by the filter.
    pub rejected: usize,
    /// Sessions after merging.
    pub merged: usize,
    /// Sessions at or above the minimum length.
    pub final_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub tracks: Vec<Track>,
    pub stats: LoadStats,
}

/// Pipeline entry points over one configuration.
pub struct TrackLoader {
    config: LoaderConfig,
    parsers: ParserRegistry,
    synced: Arc<dyn SyncedFileStore>,
}

impl TrackLoader {
    /// Loader with no synced-file exclusions.
    pub fn new(config: LoaderConfig, parsers: ParserRegistry) -> Self {
        Self {
            config,
            parsers,
            synced: Arc::new(HashSet::<String>::new()),
        }
    }

    pub fn with_synced_store(mut self, store: Arc<dyn SyncedFileStore>) -> Self {
        self.synced = store;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn scanner(&self) -> Result<DirectoryScanner> {
        DirectoryScanner::from_store(self.synced.as_ref())
    }

    /// Loads every `<format>` file in `data_dir`.
    pub async fn load_tracks(&self, data_dir: &Path, format: TrackFormat) -> Result<LoadOutcome> {
        let parser = self.parsers.get(format)?;
        let files: Vec<PathBuf> = self.scanner()?.list(data_dir, format)?.collect();
        info!(
            format = %format,
            dir = %data_dir.display(),
            files = files.len(),
            "[PIPELINE] Scanned data files"
        );

        let stats = LoadStats {
            scanned: files.len(),
            ..LoadStats::default()
        };
        let batch = load_all(files, parser).await?;
        Ok(self.finish_batch(batch, stats))
    }

    /// Loads two directories that may hold the same activities in two formats.
    ///
    /// Ids only in one directory are loaded with that directory's parser. Ids in both are
    /// loaded as one track: payload parser for the track, metadata parser for its name.
    pub async fn load_tracks_reconciled(
        &self,
        metadata_dir: &Path,
        metadata_format: TrackFormat,
        payload_dir: &Path,
        payload_format: TrackFormat,
    ) -> Result<LoadOutcome> {
        let metadata_parser = self.parsers.get(metadata_format)?;
        let payload_parser = self.parsers.get(payload_format)?;

        let scanner = self.scanner()?;
        let metadata_files: Vec<PathBuf> = scanner.list(metadata_dir, metadata_format)?.collect();
        let payload_files: Vec<PathBuf> = scanner.list(payload_dir, payload_format)?.collect();
        let partition = IdentityPartition::from_paths(&metadata_files, &payload_files);
        info!(
            metadata_format = %metadata_format,
            payload_format = %payload_format,
            metadata_files = metadata_files.len(),
            payload_files = payload_files.len(),
            both = partition.both.len(),
            metadata_only = partition.metadata_only.len(),
            payload_only = partition.payload_only.len(),
            "[PIPELINE] Reconciled activity ids"
        );

        let metadata_only: Vec<PathBuf> = partition
            .metadata_only
            .iter()
            .map(|id| path_for(metadata_dir, id, metadata_format))
            .collect();
        let payload_only: Vec<PathBuf> = partition
            .payload_only
            .iter()
            .map(|id| path_for(payload_dir, id, payload_format))
            .collect();
        let pairs: Vec<PairedFiles> = partition
            .both
            .iter()
            .map(|id| PairedFiles {
                metadata: path_for(metadata_dir, id, metadata_format),
                payload: path_for(payload_dir, id, payload_format),
            })
            .collect();

        let stats = LoadStats {
            scanned: metadata_files.len() + payload_files.len(),
            ..LoadStats::default()
        };
        let (mut batch, payload_batch, paired_batch) = futures::try_join!(
            load_all(metadata_only, Arc::clone(&metadata_parser)),
            load_all(payload_only, Arc::clone(&payload_parser)),
            load_all_paired(pairs, metadata_parser, payload_parser),
        )?;
        debug!(
            metadata_only = batch.tracks.len(),
            payload_only = payload_batch.tracks.len(),
            paired = paired_batch.tracks.len(),
            "[PIPELINE] Loaded reconciled batches"
        );
        batch.extend(payload_batch);
        batch.extend(paired_batch);
        Ok(self.finish_batch(batch, stats))
    }

    /// GPX names + FIT recordings.
    pub async fn load_tracks_gpxfit(&self, gpx_dir: &Path, fit_dir: &Path) -> Result<LoadOutcome> {
        self.load_tracks_reconciled(gpx_dir, TrackFormat::Gpx, fit_dir, TrackFormat::Fit)
            .await
    }

    /// Loads activities from the record store.
    pub async fn load_tracks_from_db(
        &self,
        source: &dyn ActivityRecordSource,
        mode: QueryMode,
    ) -> Result<LoadOutcome> {
        let records = source.query(mode).await?;
        let tracks: Vec<Track> = records.iter().map(load_from_record).collect();
        info!(?mode, tracks = tracks.len(), "[PIPELINE] All tracks from records");

        let stats = LoadStats {
            scanned: records.len(),
            loaded: tracks.len(),
            ..LoadStats::default()
        };
        Ok(self.finish(tracks, stats))
    }

    fn finish_batch(&self, batch: LoadBatch, mut stats: LoadStats) -> LoadOutcome {
        stats.failed = batch.failed.len();
        stats.loaded = batch.tracks.len();
        info!(
            loaded = stats.loaded,
            failed = stats.failed,
            "[PIPELINE] Conventionally loaded tracks"
        );
        self.finish(batch.into_tracks(), stats)
    }

    /// Shared tail: filter, merge, minimum-length cutoff.
    fn finish(&self, tracks: Vec<Track>, mut stats: LoadStats) -> LoadOutcome {
        let filtered = filter_tracks(
            tracks,
            &self.config.year_range,
            &self.config.special_file_names,
        );
        stats.filtered = filtered.kept.len();
        stats.rejected = filtered.rejected.len();
        info!(
            kept = stats.filtered,
            rejected = stats.rejected,
            "[PIPELINE] After filter tracks"
        );

        let merged = merge_tracks(filtered.kept, self.config.merge_window);
        stats.merged = merged.len();

        let tracks: Vec<Track> = merged
            .into_iter()
            .filter(|t| t.length >= self.config.min_length)
            .collect();
        stats.final_count = tracks.len();
        info!(
            merged = stats.merged,
            min_length = self.config.min_length,
            final_count = stats.final_count,
            "[PIPELINE] Finished loading tracks"
        );
        LoadOutcome { tracks, stats }
    }
}

//! Providers for the set of file names that were already ingested.
//!
//! The downloader records every file it has handed to the loader; the scanner consults
//! that list once per scan and skips those names. The core only ever reads it.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, TrackLoaderError};

/// Source of already-synced file names.
pub trait SyncedFileStore: Send + Sync {
    fn load_synced_file_list(&self) -> Result<HashSet<String>>;
}

/// An in-memory set is its own provider.
impl SyncedFileStore for HashSet<String> {
    fn load_synced_file_list(&self) -> Result<HashSet<String>> {
        Ok(self.clone())
    }
}

/// Synced list persisted as a JSON array of file names.
#[derive(Debug, Clone)]
pub struct JsonSyncedFileStore {
    path: PathBuf,
}

impl JsonSyncedFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merges `file_names` into the stored list and rewrites it atomically.
    pub fn save_synced_file_list<I, S>(&self, file_names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: BTreeSet<String> = self.load_synced_file_list()?.into_iter().collect();
        names.extend(file_names.into_iter().map(Into::into));

        let io_err = |source| TrackLoaderError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(io_err)?;

        let json = serde_json::to_string_pretty(&names)
            .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        info!(
            path = %self.path.display(),
            count = names.len(),
            "[SYNCED] Saved synced file list"
        );
        Ok(names.len())
    }
}

impl SyncedFileStore for JsonSyncedFileStore {
    fn load_synced_file_list(&self) -> Result<HashSet<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "[SYNCED] No synced file list yet");
                return Ok(HashSet::new());
            }
            Err(source) => {
                return Err(TrackLoaderError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let names: Vec<String> = serde_json::from_str(&content).map_err(|e| TrackLoaderError::Io {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        debug!(
            path = %self.path.display(),
            count = names.len(),
            "[SYNCED] Loaded synced file list"
        );
        Ok(names.into_iter().collect())
    }
}

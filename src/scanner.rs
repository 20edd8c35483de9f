//! Directory scanner: lists the data files of one format in one directory.

use std::collections::HashSet;
use std::fs::ReadDir;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, TrackLoaderError};
use crate::parser::TrackFormat;
use crate::synced::SyncedFileStore;

/// Lists candidate track files, skipping hidden and already-synced names.
///
/// Built once per pipeline invocation with the synced set it should honour.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    synced: HashSet<String>,
}

impl DirectoryScanner {
    pub fn new(synced: HashSet<String>) -> Self {
        Self { synced }
    }

    /// Reads the synced list from `store` once.
    pub fn from_store(store: &dyn SyncedFileStore) -> Result<Self> {
        let synced = store.load_synced_file_list()?;
        debug!(synced = synced.len(), "[SCAN] Loaded synced file list");
        Ok(Self::new(synced))
    }

    /// Lazily lists `<directory>/*.<format>`.
    ///
    /// Fails immediately when `directory` is not a directory.
    pub fn list(&self, directory: &Path, format: TrackFormat) -> Result<DataFiles<'_>> {
        let directory = std::path::absolute(directory).unwrap_or_else(|_| directory.to_path_buf());
        if !directory.is_dir() {
            return Err(TrackLoaderError::NotADirectory(directory));
        }
        let entries = std::fs::read_dir(&directory).map_err(|source| TrackLoaderError::Io {
            path: directory.clone(),
            source,
        })?;
        debug!(dir = %directory.display(), format = %format, "[SCAN] Listing data files");
        Ok(DataFiles {
            entries,
            suffix: format!(".{}", format.suffix()),
            synced: &self.synced,
        })
    }
}

/// Single-pass iterator over the matching files of one directory.
pub struct DataFiles<'a> {
    entries: ReadDir,
    suffix: String,
    synced: &'a HashSet<String>,
}

impl Iterator for DataFiles<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "[SCAN] Error accessing directory entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!(name = ?name, "[SCAN] Skipping non UTF-8 file name");
                continue;
            };
            if name.starts_with('.') || self.synced.contains(name) {
                continue;
            }
            let path = entry.path();
            if name.ends_with(&self.suffix) && path.is_file() {
                return Some(path);
            }
        }
        None
    }
}

//! Cross-format identity reconciliation.
//!
//! Some devices write a high-fidelity binary recording (FIT) without the title the user
//! typed in, while a companion export (GPX) of the same activity carries the title.
//! Files are matched on their activity id (base name without extension). For ids seen in
//! both formats, one track is built: geometry and timing from the payload format, name
//! from the metadata format.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ParseError;
use crate::parser::{TrackFormat, TrackParser};
use crate::track::{activity_id_of, Track};

/// Exact partition of the activity ids found in two directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPartition {
    /// Ids only present in the metadata (e.g. GPX) directory.
    pub metadata_only: BTreeSet<String>,
    /// Ids only present in the payload (e.g. FIT) directory.
    pub payload_only: BTreeSet<String>,
    /// Ids present in both.
    pub both: BTreeSet<String>,
}

impl IdentityPartition {
    pub fn from_ids<I, J>(metadata_ids: I, payload_ids: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        let metadata: BTreeSet<String> = metadata_ids.into_iter().collect();
        let payload: BTreeSet<String> = payload_ids.into_iter().collect();
        let both: BTreeSet<String> = metadata.intersection(&payload).cloned().collect();
        let partition = Self {
            metadata_only: metadata.difference(&both).cloned().collect(),
            payload_only: payload.difference(&both).cloned().collect(),
            both,
        };
        debug!(
            metadata_only = partition.metadata_only.len(),
            payload_only = partition.payload_only.len(),
            both = partition.both.len(),
            "[RECONCILE] Partitioned activity ids"
        );
        partition
    }

    pub fn from_paths(metadata_files: &[PathBuf], payload_files: &[PathBuf]) -> Self {
        Self::from_ids(
            metadata_files.iter().map(|p| activity_id_of(p)),
            payload_files.iter().map(|p| activity_id_of(p)),
        )
    }

    /// Every id seen in either directory.
    pub fn all_ids(&self) -> BTreeSet<String> {
        self.metadata_only
            .iter()
            .chain(&self.payload_only)
            .chain(&self.both)
            .cloned()
            .collect()
    }
}

/// `<dir>/<id>.<ext>`
pub fn path_for(dir: &Path, id: &str, format: TrackFormat) -> PathBuf {
    dir.join(format!("{id}.{}", format.suffix()))
}

/// Builds one track from a metadata file and a payload file of the same activity.
///
/// The payload track is kept and only its name is replaced; a failure in either file
/// fails the pair.
pub fn load_paired(
    metadata_parser: &dyn TrackParser,
    payload_parser: &dyn TrackParser,
    metadata_path: &Path,
    payload_path: &Path,
) -> Result<Track, ParseError> {
    let metadata = metadata_parser.parse(metadata_path)?;
    let mut payload = payload_parser.parse(payload_path)?;
    payload.name = metadata.name;
    Ok(payload)
}

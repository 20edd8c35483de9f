//! Single-file parser adapters and the format dispatch table.
//!
//! Decoding a GPX, TCX or FIT file is the job of an external library; this module only
//! fixes the seam. Each format gets one [`TrackParser`] implementation, registered in a
//! [`ParserRegistry`] keyed by [`TrackFormat`].
//!
//! ## Contract for implementors
//! - Return the base name of the parsed file as the track's single provenance entry
//!   (see [`Track::for_file`]).
//! - Malformed content is a [`ParseError::TrackLoad`]; the file is skipped and the batch
//!   continues.
//! - An empty but well-formed file is NOT an error: return a track with zero length and
//!   let the filter drop it.
//! - Use [`ParseError::Unrecoverable`] only when the process itself is broken.
//!
//! The trait is annotated for `mockall`, so tests can inject deterministic parsers.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, TrackLoaderError};
use crate::track::Track;

/// Supported activity file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackFormat {
    Gpx,
    Tcx,
    Fit,
}

impl TrackFormat {
    pub const ALL: [TrackFormat; 3] = [TrackFormat::Gpx, TrackFormat::Tcx, TrackFormat::Fit];

    /// File extension without the leading dot.
    pub fn suffix(&self) -> &'static str {
        match self {
            TrackFormat::Gpx => "gpx",
            TrackFormat::Tcx => "tcx",
            TrackFormat::Fit => "fit",
        }
    }
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TrackFormat {
    type Err = TrackLoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "gpx" => Ok(TrackFormat::Gpx),
            "tcx" => Ok(TrackFormat::Tcx),
            "fit" => Ok(TrackFormat::Fit),
            other => Err(TrackLoaderError::InvalidConfig(format!(
                "Unsupported track format: {other}"
            ))),
        }
    }
}

/// Turns one file into one [`Track`].
///
/// Called from blocking worker threads, hence `Send + Sync` and a synchronous signature.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait TrackParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<Track, ParseError>;
}

impl<F> TrackParser for F
where
    F: Fn(&Path) -> Result<Track, ParseError> + Send + Sync,
{
    fn parse(&self, path: &Path) -> Result<Track, ParseError> {
        self(path)
    }
}

/// Format → parser dispatch table.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<TrackFormat, Arc<dyn TrackParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the parser for `format`.
    pub fn register(mut self, format: TrackFormat, parser: Arc<dyn TrackParser>) -> Self {
        self.parsers.insert(format, parser);
        self
    }

    pub fn get(&self, format: TrackFormat) -> Result<Arc<dyn TrackParser>, TrackLoaderError> {
        self.parsers
            .get(&format)
            .cloned()
            .ok_or(TrackLoaderError::MissingParser(format))
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("formats", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}

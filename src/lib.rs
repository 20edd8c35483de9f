#![doc = "track-loader: loading and reconciliation pipeline for activity tracks."]

//! Ingests directories of GPX/TCX/FIT files (or activity records from a database export),
//! reconciles activities recorded in two formats, drops invalid tracks, merges
//! back-to-back recordings into sessions and returns an ordered list of tracks.
//!
//! # Layout
//! - [`parser`]: per-format parser seam and dispatch table
//! - [`scanner`], [`synced`]: directory listing with synced-file exclusion
//! - [`reconcile`]: cross-format identity matching
//! - [`concurrent`]: parallel fan-out of parser units
//! - [`filter`], [`merge`]: data-quality filtering and session merging
//! - [`records`]: activity records and the record source seam
//! - [`loader`]: the pipelines tying it together
//!
//! Per-format decoding, downloading and rendering live outside this crate.

pub mod cli;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod filter;
pub mod load_config;
pub mod loader;
pub mod merge;
pub mod parser;
pub mod reconcile;
pub mod records;
pub mod scanner;
pub mod synced;
pub mod track;
pub mod year_range;

pub use cli::{run, Cli, Commands};
pub use error::{ParseError, TrackLoadError, TrackLoaderError};
pub use loader::{LoadOutcome, LoadStats, TrackLoader};
pub use parser::{ParserRegistry, TrackFormat, TrackParser};
pub use track::Track;
pub use year_range::YearRange;

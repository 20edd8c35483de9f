//! Activity records from the relational store, and their mapping to tracks.
//!
//! The store itself is an external collaborator: the pipeline only sees the
//! [`ActivityRecordSource`] trait. [`JsonRecordSource`] reads a JSON export of the
//! activity table, which is what the CLI uses.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Result, TrackLoaderError};
use crate::track::Track;

/// One row of the activity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub run_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Metres.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub elapsed_time: i64,
    /// `YYYY-MM-DD HH:MM:SS` (local wall time) or RFC 3339.
    pub start_date_local: String,
    #[serde(default)]
    pub summary_polyline: String,
}

/// Which activities a pipeline run asks the store for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Everything except flights.
    #[default]
    Default,
    /// Everything except flights, and only activities with a polyline.
    Grid,
    /// Everything except flights and road trips.
    Circular,
}

impl QueryMode {
    pub fn excluded_types(&self) -> &'static [&'static str] {
        match self {
            QueryMode::Default | QueryMode::Grid => &["Flight"],
            QueryMode::Circular => &["RoadTrip", "Flight"],
        }
    }

    pub fn requires_polyline(&self) -> bool {
        matches!(self, QueryMode::Grid)
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        !self
            .excluded_types()
            .contains(&record.activity_type.as_str())
            && (!self.requires_polyline() || !record.summary_polyline.is_empty())
    }
}

impl std::str::FromStr for QueryMode {
    type Err = TrackLoaderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(QueryMode::Default),
            "grid" => Ok(QueryMode::Grid),
            "circular" => Ok(QueryMode::Circular),
            other => Err(TrackLoaderError::InvalidConfig(format!(
                "Unknown query mode: {other}"
            ))),
        }
    }
}

/// Read-only source of already-parsed activities, ordered by local start date.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ActivityRecordSource: Send + Sync {
    async fn query(&self, mode: QueryMode) -> Result<Vec<ActivityRecord>>;
}

/// Record source backed by a JSON array export of the activity table.
#[derive(Debug, Clone)]
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActivityRecordSource for JsonRecordSource {
    async fn query(&self, mode: QueryMode) -> Result<Vec<ActivityRecord>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TrackLoaderError::Io {
                path: self.path.clone(),
                source,
            })?;
        let records: Vec<ActivityRecord> = serde_json::from_str(&content).map_err(|e| {
            TrackLoaderError::RecordSource(format!(
                "Failed to parse records from {}: {e}",
                self.path.display()
            ))
        })?;
        let total = records.len();
        let mut selected: Vec<ActivityRecord> =
            records.into_iter().filter(|r| mode.matches(r)).collect();
        selected.sort_by(|a, b| a.start_date_local.cmp(&b.start_date_local));
        info!(
            path = %self.path.display(),
            ?mode,
            total,
            selected = selected.len(),
            "[RECORDS] Queried activity records"
        );
        Ok(selected)
    }
}

/// Parses a stored start date. Naive wall times are taken at offset zero.
pub fn parse_start_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Maps a record to a track without touching the filesystem.
///
/// An unparseable start date leaves the start time empty; the filter drops such tracks.
pub fn load_from_record(record: &ActivityRecord) -> Track {
    let mut track = Track::new(record.run_id.to_string(), record.activity_type.clone())
        .with_length(record.distance);
    track.name = record.name.clone();
    track.run_id = Some(record.run_id);
    if !record.summary_polyline.is_empty() {
        track.polylines.push(record.summary_polyline.clone());
    }
    match parse_start_date(&record.start_date_local) {
        Some(start) => {
            let end = start + Duration::seconds(record.elapsed_time.max(0));
            track = track.with_times(start, end);
        }
        None => debug!(
            run_id = record.run_id,
            start = %record.start_date_local,
            "[RECORDS] Unparseable start date"
        ),
    }
    track
}

impl From<&ActivityRecord> for Track {
    fn from(record: &ActivityRecord) -> Self {
        load_from_record(record)
    }
}

//! The [`Track`] data model: one recorded activity session.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One continuous recorded activity session, possibly assembled from several files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Provenance: base names of every file (or record id) that contributed. Never empty.
    pub file_names: Vec<String>,
    /// Activity type as reported by the source, e.g. "Run", "Ride", "Flight".
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Human-entered title, if the source carries one.
    pub name: Option<String>,
    pub start_time_local: Option<DateTime<FixedOffset>>,
    pub end_time_local: Option<DateTime<FixedOffset>>,
    /// Distance in metres.
    pub length: f64,
    pub special: bool,
    /// Encoded polyline segments.
    pub polylines: Vec<String>,
    pub run_id: Option<i64>,
}

impl Track {
    pub fn new(file_name: impl Into<String>, activity_type: impl Into<String>) -> Self {
        Self {
            file_names: vec![file_name.into()],
            activity_type: activity_type.into(),
            name: None,
            start_time_local: None,
            end_time_local: None,
            length: 0.0,
            special: false,
            polylines: Vec::new(),
            run_id: None,
        }
    }

    /// Track whose provenance is the base name of `path`.
    pub fn for_file(path: &Path, activity_type: impl Into<String>) -> Self {
        Self::new(file_name_of(path), activity_type)
    }

    /// Sets start and end. An end before the start is clamped to the start.
    pub fn with_times(mut self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        self.start_time_local = Some(start);
        self.end_time_local = Some(end.max(start));
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length.max(0.0);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_polyline(mut self, polyline: impl Into<String>) -> Self {
        self.polylines.push(polyline.into());
        self
    }

    /// First provenance entry; used for logging and the special-name lookup.
    pub fn primary_file_name(&self) -> &str {
        self.file_names.first().map(String::as_str).unwrap_or("")
    }

    /// Absorbs a later track of the same session.
    ///
    /// End time becomes the later of the two ends, lengths add up and provenance and
    /// geometry are appended in order. Start time, type and name stay those of `self`.
    pub fn append(&mut self, other: Track) {
        self.end_time_local = match (self.end_time_local, other.end_time_local) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.length += other.length;
        self.file_names.extend(other.file_names);
        self.polylines.extend(other.polylines);
    }
}

/// Base name of a path as an owned string (lossy for non-UTF-8 names).
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Activity identifier: base name without extension.
pub fn activity_id_of(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .timestamp_opt(1_600_000_000 + secs, 0)
            .unwrap()
    }

    #[test]
    fn append_extends_end_and_accumulates() {
        let mut first = Track::new("a.gpx", "Run")
            .with_times(at(0), at(600))
            .with_length(1000.0)
            .with_polyline("abc");
        let second = Track::new("b.gpx", "Run")
            .with_times(at(700), at(1200))
            .with_length(500.0)
            .with_polyline("def");

        first.append(second);

        assert_eq!(first.start_time_local, Some(at(0)));
        assert_eq!(first.end_time_local, Some(at(1200)));
        assert_eq!(first.length, 1500.0);
        assert_eq!(first.file_names, vec!["a.gpx", "b.gpx"]);
        assert_eq!(first.polylines, vec!["abc", "def"]);
    }

    #[test]
    fn append_never_moves_end_backwards() {
        let mut long = Track::new("a.fit", "Ride").with_times(at(0), at(5000));
        long.append(Track::new("b.fit", "Ride").with_times(at(100), at(200)));
        assert_eq!(long.end_time_local, Some(at(5000)));
    }

    #[test]
    fn ids_and_names_from_paths() {
        let p = Path::new("/data/GPX_OUT/12345.gpx");
        assert_eq!(file_name_of(p), "12345.gpx");
        assert_eq!(activity_id_of(p), "12345");
        assert_eq!(Track::for_file(p, "Run").primary_file_name(), "12345.gpx");
    }

    #[test]
    fn with_times_clamps_inverted_range() {
        let t = Track::new("x.gpx", "Run").with_times(at(100), at(50));
        assert_eq!(t.end_time_local, t.start_time_local);
        assert_eq!(t.start_time_local, Some(at(100)));
    }
}

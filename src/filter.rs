//! Data-quality filter. Rejections are expected and frequent, so they are logged, never raised.

use std::collections::HashSet;
use std::fmt;
use tracing::info;

use crate::track::Track;
use crate::year_range::YearRange;

/// Why a track was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyTrack,
    NoStartTime,
    WrongYear(i32),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyTrack => write!(f, "skipping empty track"),
            RejectReason::NoStartTime => write!(f, "skipping track without start time"),
            RejectReason::WrongYear(year) => write!(f, "skipping track with wrong year {year}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectReason,
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Track>,
    pub rejected: Vec<Rejection>,
}

/// Checks one track; `None` means it passes.
pub fn rejection_reason(track: &Track, year_range: &YearRange) -> Option<RejectReason> {
    use chrono::Datelike;

    if track.length <= 0.0 {
        return Some(RejectReason::EmptyTrack);
    }
    let Some(start) = track.start_time_local else {
        return Some(RejectReason::NoStartTime);
    };
    if !year_range.contains(&start) {
        return Some(RejectReason::WrongYear(start.year()));
    }
    None
}

/// Keeps tracks with a length, a start time and a start year inside `year_range`.
/// Survivors get `special` set from their primary file name.
pub fn filter_tracks(
    tracks: Vec<Track>,
    year_range: &YearRange,
    special_file_names: &HashSet<String>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for mut track in tracks {
        let file_name = track.primary_file_name().to_string();
        match rejection_reason(&track, year_range) {
            Some(reason) => {
                info!(file = %file_name, %reason, "[FILTER] Track rejected");
                outcome.rejected.push(Rejection { file_name, reason });
            }
            None => {
                track.special = special_file_names.contains(&file_name);
                outcome.kept.push(track);
            }
        }
    }
    outcome
}

//! Coalesces consecutive same-type tracks into sessions.
//!
//! A device restart or a short pause splits one outing into several files. After a stable
//! sort by start time, a track joins the previous output entry when it starts at or after
//! that entry's end, less than the merge window later, and has the same type. A type change
//! or a gap of a full window (or more) opens a new session.

use chrono::Duration;
use tracing::info;

use crate::track::Track;

/// Default merge window in seconds.
pub const DEFAULT_MERGE_WINDOW_SECS: i64 = 3600;

pub fn default_merge_window() -> Duration {
    Duration::seconds(DEFAULT_MERGE_WINDOW_SECS)
}

/// Whether `next` would be absorbed by `last` under `window`.
pub fn should_merge(last: &Track, next: &Track, window: Duration) -> bool {
    let (Some(last_end), Some(next_start)) = (last.end_time_local, next.start_time_local) else {
        return false;
    };
    let gap = next_start - last_end;
    gap >= Duration::zero() && gap < window && last.activity_type == next.activity_type
}

/// Sorts by start time and merges adjacent tracks within `window`.
pub fn merge_tracks(mut tracks: Vec<Track>, window: Duration) -> Vec<Track> {
    let input = tracks.len();
    // stable: equal starts keep input order; tracks without a start sort first
    tracks.sort_by_key(|t| t.start_time_local);

    let mut merged: Vec<Track> = Vec::with_capacity(input);
    for track in tracks {
        if let Some(last) = merged.last_mut() {
            if should_merge(last, &track, window) {
                last.append(track);
                continue;
            }
        }
        merged.push(track);
    }

    info!(
        input,
        output = merged.len(),
        merged = input - merged.len(),
        "[MERGE] Merged tracks"
    );
    merged
}

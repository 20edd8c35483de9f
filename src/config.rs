use chrono::Duration;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::merge::default_merge_window;
use crate::year_range::YearRange;

/// Tracks shorter than this (metres) are dropped at the end of every pipeline.
pub const DEFAULT_MIN_LENGTH: f64 = 100.0;

/// Policy knobs of the loading pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub min_length: f64,
    pub year_range: YearRange,
    pub special_file_names: HashSet<String>,
    pub merge_window: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            year_range: YearRange::all(),
            special_file_names: HashSet::new(),
            merge_window: default_merge_window(),
        }
    }
}

impl LoaderConfig {
    pub fn trace_loaded(&self) {
        info!(
            min_length = self.min_length,
            year_range = %self.year_range,
            special = self.special_file_names.len(),
            merge_window_secs = self.merge_window.num_seconds(),
            "Loaded LoaderConfig"
        );
        debug!(?self, "LoaderConfig loaded (full debug)");
    }
}

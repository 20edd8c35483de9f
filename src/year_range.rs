//! Inclusive range of calendar years used to filter tracks.

use chrono::{DateTime, Datelike, FixedOffset};
use std::fmt;

use crate::error::{Result, TrackLoaderError};

/// Inclusive `[from, to]` range of years. Unbounded when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    bounds: Option<(i32, i32)>,
}

impl YearRange {
    /// Range that contains every year.
    pub fn all() -> Self {
        Self::default()
    }

    /// Range from `from` to `to` inclusive. `None` when `from > to`.
    pub fn new(from: i32, to: i32) -> Option<Self> {
        (from <= to).then_some(Self {
            bounds: Some((from, to)),
        })
    }

    pub fn single(year: i32) -> Self {
        Self {
            bounds: Some((year, year)),
        }
    }

    /// Accepts `all`, `2019` or `2015-2020`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        let re = regex::Regex::new(r"^(\d+)(?:-(\d+))?$")
            .map_err(|e| TrackLoaderError::InvalidConfig(format!("year range pattern: {e}")))?;
        let caps = re.captures(s).ok_or_else(|| {
            TrackLoaderError::InvalidConfig(format!("Unrecognised year range: {s:?}"))
        })?;
        let year = |i: usize| -> Result<Option<i32>> {
            caps.get(i)
                .map(|m| {
                    m.as_str().parse::<i32>().map_err(|e| {
                        TrackLoaderError::InvalidConfig(format!("Bad year {:?}: {e}", m.as_str()))
                    })
                })
                .transpose()
        };
        let from = year(1)?.unwrap_or_default();
        let to = year(2)?.unwrap_or(from);
        Self::new(from, to).ok_or_else(|| {
            TrackLoaderError::InvalidConfig(format!("Year range is reversed: {s:?}"))
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn contains(&self, t: &DateTime<FixedOffset>) -> bool {
        self.contains_year(t.year())
    }

    fn contains_year(&self, year: i32) -> bool {
        match self.bounds {
            None => true,
            Some((from, to)) => from <= year && year <= to,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            None => write!(f, "all"),
            Some((from, to)) if from == to => write!(f, "{from}"),
            Some((from, to)) => write!(f, "{from}-{to}"),
        }
    }
}

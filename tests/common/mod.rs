#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use track_loader::{ParseError, Track};
use tracing_subscriber::{layer::Context, Layer};

/// 2021-05-02 09:00 +02:00
pub fn t0() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2021, 5, 2, 9, 0, 0)
        .unwrap()
}

pub fn at(secs: i64) -> DateTime<FixedOffset> {
    t0() + Duration::seconds(secs)
}

pub fn track(name: &str, kind: &str, start: i64, end: i64, length: f64) -> Track {
    Track::new(name, kind)
        .with_times(at(start), at(end))
        .with_length(length)
}

/// Writes a tiny `key=value` fixture understood by [`fixture_parser`].
pub fn write_fixture(dir: &Path, file_name: &str, lines: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(file_name);
    let body: String = lines.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
    fs::write(&path, body).unwrap();
    path
}

/// Standard valid fixture: a run starting `start` seconds after [`t0`].
pub fn write_run(dir: &Path, file_name: &str, start: i64, end: i64, length: f64) -> PathBuf {
    write_fixture(
        dir,
        file_name,
        &[
            ("type", "Run"),
            ("start", &at(start).to_rfc3339()),
            ("end", &at(end).to_rfc3339()),
            ("length", &length.to_string()),
        ],
    )
}

/// Stand-in for a real format decoder.
///
/// Reads `key=value` lines; a file containing `malformed` is a per-file load error and
/// a file containing `explode` is an unrecoverable error.
pub fn fixture_parser(path: &Path) -> Result<Track, ParseError> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::Unrecoverable(Box::new(e)))?;
    if content.contains("explode") {
        return Err(ParseError::Unrecoverable("decoder crashed".into()));
    }
    if content.contains("malformed") {
        return Err(ParseError::malformed(format!(
            "cannot parse {}",
            path.display()
        )));
    }
    let get = |key: &str| {
        content
            .lines()
            .find_map(|l| l.strip_prefix(&format!("{key}=")).map(str::to_string))
    };
    let mut track = Track::for_file(path, get("type").unwrap_or_else(|| "Run".into()));
    if let (Some(start), Some(end)) = (get("start"), get("end")) {
        let start = DateTime::parse_from_rfc3339(&start).map_err(|e| ParseError::malformed(e.to_string()))?;
        let end = DateTime::parse_from_rfc3339(&end).map_err(|e| ParseError::malformed(e.to_string()))?;
        track = track.with_times(start, end);
    }
    if let Some(length) = get("length") {
        track = track.with_length(length.parse().map_err(|_| ParseError::malformed("bad length"))?);
    }
    if let Some(name) = get("name") {
        track = track.with_name(name);
    }
    Ok(track)
}

/// Layer collecting the debug rendering of every event.
pub struct EventCollector {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

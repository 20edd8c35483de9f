mod common;

use common::{fixture_parser, write_fixture, write_run, EventCollector};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use track_loader::concurrent::{load_all, load_all_paired, PairedFiles};
use track_loader::parser::MockTrackParser;
use track_loader::{ParseError, Track, TrackLoaderError, TrackParser};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

fn fixture() -> Arc<dyn TrackParser> {
    Arc::new(fixture_parser)
}

#[tokio::test]
async fn test_malformed_files_are_logged_and_skipped() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..12 {
        let name = format!("{i}.gpx");
        if i % 4 == 0 {
            paths.push(write_fixture(dir.path(), &name, &[("malformed", "yes")]));
        } else {
            paths.push(write_run(dir.path(), &name, i * 100, i * 100 + 50, 1000.0));
        }
    }

    let batch = load_all(paths.clone(), fixture()).await.expect("batch should not abort");

    assert_eq!(batch.tracks.len(), 9, "N - K tracks expected");
    assert_eq!(batch.failed.len(), 3);
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(batch.tracks.contains_key(path), i % 4 != 0, "{}", path.display());
    }

    let logged = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.contains("[LOAD] Error while loading file"))
        .count();
    assert_eq!(logged, 3, "one error event per malformed file");
}

#[tokio::test]
async fn test_one_bad_file_among_ten_leaves_nine() {
    let mut parser = MockTrackParser::new();
    parser.expect_parse().times(10).returning(|p: &Path| {
        if p.ends_with("5.fit") {
            Err(ParseError::malformed("truncated FIT header"))
        } else {
            Ok(Track::for_file(p, "Ride").with_length(2000.0))
        }
    });
    let paths: Vec<PathBuf> = (0..10).map(|i| PathBuf::from(format!("/data/{i}.fit"))).collect();

    let batch = load_all(paths, Arc::new(parser)).await.unwrap();

    assert_eq!(batch.tracks.len(), 9);
    assert_eq!(batch.failed[0].0, PathBuf::from("/data/5.fit"));
    assert_eq!(batch.failed[0].1.reason, "truncated FIT header");
}

#[tokio::test]
async fn test_unrecoverable_failure_aborts_batch() {
    let dir = tempdir().unwrap();
    let paths = vec![
        write_run(dir.path(), "ok.gpx", 0, 10, 100.0),
        write_fixture(dir.path(), "boom.gpx", &[("explode", "1")]),
    ];

    let err = load_all(paths, fixture()).await.unwrap_err();

    match err {
        TrackLoaderError::Unrecoverable { path, reason } => {
            assert!(path.ends_with("boom.gpx"));
            assert!(reason.contains("decoder crashed"));
        }
        other => panic!("expected Unrecoverable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_panicking_unit_aborts_batch() {
    let parser: Arc<dyn TrackParser> = Arc::new(|_: &Path| -> Result<Track, ParseError> {
        panic!("parser bug")
    });

    let err = load_all(vec![PathBuf::from("x.tcx")], parser).await.unwrap_err();

    assert!(matches!(err, TrackLoaderError::Task(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_batch() {
    let batch = load_all(Vec::new(), fixture()).await.unwrap();
    assert!(batch.tracks.is_empty());
    assert!(batch.failed.is_empty());
}

#[tokio::test]
async fn test_paired_units_keyed_by_payload_path() {
    let dir = tempdir().unwrap();
    let gpx = write_fixture(dir.path(), "9.gpx", &[("name", "Lunch ride"), ("length", "1")]);
    let fit = write_run(dir.path(), "9.fit", 0, 3000, 25000.0);
    let bad_gpx = write_fixture(dir.path(), "10.gpx", &[("malformed", "1")]);
    let ok_fit = write_run(dir.path(), "10.fit", 0, 3000, 25000.0);

    let batch = load_all_paired(
        vec![
            PairedFiles {
                metadata: gpx,
                payload: fit.clone(),
            },
            PairedFiles {
                metadata: bad_gpx,
                payload: ok_fit.clone(),
            },
        ],
        fixture(),
        fixture(),
    )
    .await
    .unwrap();

    assert_eq!(batch.tracks.len(), 1);
    let track = &batch.tracks[&fit];
    assert_eq!(track.name.as_deref(), Some("Lunch ride"));
    assert_eq!(track.length, 25000.0);
    assert_eq!(track.file_names, vec!["9.fit"]);
    assert_eq!(batch.failed[0].0, ok_fit);
}

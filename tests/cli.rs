use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

/// Creates a config file pointing the synced file list at `synced`.
fn create_config(synced: &std::path::Path) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        format!("min_length: 100\nsynced_file_list: {}\n", synced.display()),
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn scan_lists_only_new_visible_files() {
    let dir = tempdir().unwrap();
    for name in ["1.gpx", "2.gpx", "3.gpx", ".4.gpx", "5.gpx", "notes.txt"] {
        write(dir.path().join(name), b"").unwrap();
    }
    let state = tempdir().unwrap();
    let synced = state.path().join("imported.json");
    write(&synced, br#"["5.gpx"]"#).unwrap();
    let config = create_config(&synced);

    let mut cmd = Command::cargo_bin("track-loader").expect("Binary exists");
    cmd.arg("scan")
        .arg("--dir")
        .arg(dir.path())
        .arg("--format")
        .arg("gpx")
        .arg("--config")
        .arg(config.path())
        .env_remove("TRACK_LOADER_SYNCED_FILE_LIST");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GPX files: 3"))
        .stdout(predicate::str::contains("1.gpx"))
        .stdout(predicate::str::contains(".4.gpx").not())
        .stdout(predicate::str::contains("5.gpx").not());
}

#[test]
fn scan_fails_for_missing_directory() {
    let mut cmd = Command::cargo_bin("track-loader").expect("Binary exists");
    cmd.arg("scan")
        .arg("--dir")
        .arg("/definitely/not/a/track/dir")
        .arg("--format")
        .arg("fit");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Not a directory"));
}

#[test]
fn load_db_prints_summary_and_tracks() {
    let records = NamedTempFile::new().unwrap();
    write(
        records.path(),
        br#"[
  {"run_id": 1, "name": "Morning", "type": "Run", "distance": 3000.0, "elapsed_time": 1200,
   "start_date_local": "2023-01-01 07:00:00", "summary_polyline": "abc"},
  {"run_id": 2, "name": "Morning", "type": "Run", "distance": 2000.0, "elapsed_time": 900,
   "start_date_local": "2023-01-01 07:30:00", "summary_polyline": "def"},
  {"run_id": 3, "name": "Plane", "type": "Flight", "distance": 900000.0, "elapsed_time": 7200,
   "start_date_local": "2023-01-02 07:00:00", "summary_polyline": "ghi"}
]"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("track-loader").expect("Binary exists");
    cmd.arg("load-db")
        .arg("--records")
        .arg(records.path())
        .arg("--mode")
        .arg("default");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Load complete."))
        .stdout(predicate::str::contains("final_count: 1"))
        .stdout(predicate::str::contains("5000 m"))
        .stdout(predicate::str::contains("1,2"))
        .stdout(predicate::str::contains("Plane").not());
}

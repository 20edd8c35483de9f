/// CLI glue for track-loader: command parsing and user-visible output.
///
/// All loading logic lives in the library modules; this module only maps arguments
/// onto them and prints results.
///
/// ## How To Use
/// - From the shell: `track-loader --help`.
/// - From tests: build a [`Cli`] and call [`run`].
///
/// Directory pipelines need format parsers, which are supplied by the embedding
/// application; the binary therefore exposes scanning and the record pipeline only.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::load_config::{load_config, CliConfig};
use crate::loader::TrackLoader;
use crate::parser::{ParserRegistry, TrackFormat};
use crate::records::{JsonRecordSource, QueryMode};
use crate::scanner::DirectoryScanner;
use crate::synced::{JsonSyncedFileStore, SyncedFileStore};

/// CLI for track-loader: load, reconcile and merge activity tracks.
#[derive(Parser)]
#[clap(
    name = "track-loader",
    version,
    about = "Load, reconcile and merge activity tracks from GPX/TCX/FIT exports and activity databases"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the data files a load would pick up from a directory
    Scan {
        /// Directory holding the track files
        #[clap(long)]
        dir: PathBuf,
        /// File format: gpx, tcx or fit
        #[clap(long)]
        format: TrackFormat,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Run the record pipeline over a JSON export of the activity table
    LoadDb {
        /// JSON array of activity records
        #[clap(long)]
        records: PathBuf,
        /// Query mode: default, grid or circular
        #[clap(long, default_value = "default")]
        mode: QueryMode,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

fn config_or_default(path: Option<PathBuf>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            tracing::info!("No config file given, using defaults");
            Ok(CliConfig::default())
        }
    }
}

fn synced_store(config: &CliConfig) -> Arc<dyn SyncedFileStore> {
    match &config.synced_file_list {
        Some(path) => Arc::new(JsonSyncedFileStore::new(path)),
        None => Arc::new(std::collections::HashSet::<String>::new()),
    }
}

/// Async CLI entrypoint shared by `main()` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan {
            dir,
            format,
            config,
        } => {
            tracing::info!(command = "scan", dir = %dir.display(), %format, "Starting command");
            let config = config_or_default(config)?;
            let store = synced_store(&config);
            let scanner = DirectoryScanner::from_store(store.as_ref())?;
            let mut count = 0usize;
            for path in scanner.list(&dir, format)? {
                println!("{}", path.display());
                count += 1;
            }
            println!("{} files: {}", format.suffix().to_uppercase(), count);
            Ok(())
        }
        Commands::LoadDb {
            records,
            mode,
            config,
        } => {
            tracing::info!(command = "load-db", records = %records.display(), ?mode, "Starting command");
            let config = config_or_default(config)?;
            let store = synced_store(&config);
            let loader =
                TrackLoader::new(config.loader, ParserRegistry::new()).with_synced_store(store);
            let source = JsonRecordSource::new(&records);
            let outcome = loader
                .load_tracks_from_db(&source, mode)
                .await
                .with_context(|| format!("Loading records from {}", records.display()))?;

            println!("Load complete.\nStats:");
            println!("{:#?}", outcome.stats);
            for track in &outcome.tracks {
                println!(
                    "{}\t{}\t{}\t{:.0} m\t{}",
                    track
                        .start_time_local
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                    track.activity_type,
                    track.name.as_deref().unwrap_or("-"),
                    track.length,
                    track.file_names.join(",")
                );
            }
            tracing::info!(command = "load-db", stats = ?outcome.stats, "Command complete");
            Ok(())
        }
    }
}

/// `load_config` module: reads the YAML config file into a [`CliConfig`].
///
/// This is the only place where user-supplied YAML is parsed and mapped to the typed
/// [`LoaderConfig`]. Loosely typed keys (the year range string, the merge window in
/// seconds) are validated here so that the core only ever sees well-formed values.
///
/// # Environment
/// - `TRACK_LOADER_SYNCED_FILE_LIST`: overrides `synced_file_list` from the file.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{LoaderConfig, DEFAULT_MIN_LENGTH};
use crate::merge::DEFAULT_MERGE_WINDOW_SECS;
use crate::year_range::YearRange;

pub const SYNCED_FILE_LIST_ENV: &str = "TRACK_LOADER_SYNCED_FILE_LIST";

/// Everything the CLI needs from the config file.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub loader: LoaderConfig,
    pub synced_file_list: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_min_length")]
    min_length: f64,
    #[serde(default = "default_year_range")]
    year_range: String,
    #[serde(default)]
    special_file_names: Vec<String>,
    #[serde(default = "default_merge_window_secs")]
    merge_window_secs: i64,
    #[serde(default)]
    synced_file_list: Option<PathBuf>,
}

fn default_min_length() -> f64 {
    DEFAULT_MIN_LENGTH
}

fn default_year_range() -> String {
    "all".to_string()
}

fn default_merge_window_secs() -> i64 {
    DEFAULT_MERGE_WINDOW_SECS
}

/// Loads the YAML config at `path` and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let config = from_raw(raw)?;
    config.loader.trace_loaded();
    Ok(config)
}

fn from_raw(raw: RawConfig) -> Result<CliConfig> {
    if !raw.min_length.is_finite() || raw.min_length < 0.0 {
        anyhow::bail!("min_length must be a non-negative number, got {}", raw.min_length);
    }
    if raw.merge_window_secs < 0 {
        anyhow::bail!(
            "merge_window_secs must not be negative, got {}",
            raw.merge_window_secs
        );
    }
    let Some(merge_window) = Duration::try_seconds(raw.merge_window_secs) else {
        anyhow::bail!(
            "merge_window_secs is out of range, got {}",
            raw.merge_window_secs
        );
    };
    let year_range = YearRange::parse(&raw.year_range)
        .with_context(|| format!("Invalid year_range in config: {:?}", raw.year_range))?;

    let synced_file_list = match std::env::var(SYNCED_FILE_LIST_ENV) {
        Ok(path) if !path.is_empty() => {
            info!(path = %path, "{SYNCED_FILE_LIST_ENV} found in env, overriding config");
            Some(PathBuf::from(path))
        }
        _ => raw.synced_file_list,
    };

    Ok(CliConfig {
        loader: LoaderConfig {
            min_length: raw.min_length,
            year_range,
            special_file_names: raw.special_file_names.into_iter().collect(),
            merge_window,
        },
        synced_file_list,
    })
}

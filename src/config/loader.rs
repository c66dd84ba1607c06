use std::fs;
use std::path::{Path, PathBuf};

use super::core::OoMetricsConfig;
use crate::core::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".oometrics.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse a TOML config and reject values no run could use.
pub fn parse_and_validate_config(contents: &str) -> std::result::Result<OoMetricsConfig, String> {
    let config = toml::from_str::<OoMetricsConfig>(contents)
        .map_err(|e| format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))?;

    if config.parallel.jobs == Some(0) {
        return Err("parallel.jobs must be at least 1".to_string());
    }
    if config
        .analysis
        .root_type
        .as_deref()
        .is_some_and(|root| root.trim().is_empty())
    {
        return Err("analysis.root_type must not be empty".to_string());
    }

    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<OoMetricsConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // Absent files are the normal case while walking up
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to read config file {}: {}", config_path.display(), e);
            }
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{} in {}. Using defaults.", e, config_path.display());
            None
        }
    }
}

/// `start` and its parents, nearest first, at most `max_depth` of them.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| dir.parent().map(Path::to_path_buf)).take(max_depth)
}

/// Find the nearest `.oometrics.toml` above the working directory.
///
/// Never fails: unreadable or invalid files are logged and skipped.
pub fn load_config() -> OoMetricsConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using default config.", e);
            return OoMetricsConfig::default();
        }
    };
    load_config_above(current)
}

pub(crate) fn load_config_above(start: PathBuf) -> OoMetricsConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            OoMetricsConfig::default()
        })
}

/// Load an explicitly named config file. Unlike [`load_config`], any
/// problem with the file is an error.
pub fn load_config_from(path: &Path) -> Result<OoMetricsConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!("cannot read config: {e}"), path)
    })?;
    parse_and_validate_config(&contents)
        .map_err(|message| Error::configuration(message, path))
}

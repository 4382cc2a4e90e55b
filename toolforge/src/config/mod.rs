//! Layered YAML configuration.
//!
//! Files are read from least to most specific; a key set in a later file
//! replaces the same key from an earlier one, nested mappings are merged.

pub mod types;

pub use types::*;

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unable to load configuration: {0}")]
    Invalid(#[source] serde_yaml::Error),
}

/// Config file locations, least to most priority.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/toolforge-cli.yaml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".toolforge.yaml"));
        paths.push(home.join(".config").join("toolforge.yaml"));
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("toolforge.yaml"));
    }
    paths
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&default_config_paths())
}

/// Merge every existing file of `paths` in order and deserialize the result.
pub fn load_config_from(paths: &[PathBuf]) -> Result<Config, ConfigError> {
    let mut merged = Value::Mapping(Mapping::new());

    for path in paths {
        if !path.is_file() {
            debug!("Unable to find config file {}, skipping", path.display());
            continue;
        }
        let layer = read_layer(path)?;
        merge(&mut merged, layer);
        debug!("Updating config from {}", path.display());
    }

    serde_yaml::from_value(merged).map_err(ConfigError::Invalid)
}

fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    // an empty file parses as null
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}

fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(base), Value::Mapping(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

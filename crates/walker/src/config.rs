//! The `config.json` store shared by the walker and sensor tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::Offset;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid location_offset: {0}")]
    InvalidOffset(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Contents of `config.json`.
///
/// Keys this crate does not know about are kept in `extra` so a save never
/// drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Emulator installation directory (the one holding `adb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emu_dir: Option<String>,

    /// Inline route as `[lat, lon]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_path: Option<Vec<Value>>,

    /// Route file (`.gpx`, `.json` or a `WALK_PATH` list file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_path_file: Option<String>,

    /// `{"lat": .., "lon": ..}` in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_offset: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WalkerConfig {
    /// Parses `location_offset`, defaulting to zero when absent or empty.
    ///
    /// Both components accept numbers or numeric strings and must be finite.
    pub fn offset(&self) -> Result<Offset, ConfigError> {
        let map = match &self.location_offset {
            None | Some(Value::Null) => return Ok(Offset::ZERO),
            Some(Value::Object(map)) if map.is_empty() => return Ok(Offset::ZERO),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ConfigError::InvalidOffset(format!(
                    "expected an object, got {other}"
                )));
            }
        };

        let offset = Offset {
            lat: offset_component(map, "lat")?,
            lon: offset_component(map, "lon")?,
        };
        if !offset.is_finite() {
            return Err(ConfigError::InvalidOffset("components must be finite".into()));
        }
        Ok(offset)
    }
}

fn offset_component(map: &Map<String, Value>, key: &str) -> Result<f64, ConfigError> {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ConfigError::InvalidOffset(format!("{key} is not a float"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidOffset(format!("{key}: {e}"))),
        Some(other) => Err(ConfigError::InvalidOffset(format!(
            "{key} must be a number, got {other}"
        ))),
        None => Err(ConfigError::InvalidOffset(format!("missing key {key}"))),
    }
}

/// Reads and writes [`WalkerConfig`] at a fixed path.
///
/// Relative paths found inside the config resolve against the directory
/// containing the config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative config paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Loads the config; a missing file yields the default config.
    pub fn load(&self) -> Result<WalkerConfig, ConfigError> {
        if !self.path.exists() {
            debug!("No config at {}, using defaults", self.path.display());
            return Ok(WalkerConfig::default());
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the config back as pretty-printed JSON.
    pub fn save(&self, config: &WalkerConfig) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Resolves a path string from the config: `~/` expands to the home
    /// directory, absolute paths pass through, everything else is relative
    /// to [`Self::base_dir`].
    pub fn resolve_path(&self, value: &str) -> PathBuf {
        let expanded = expand_home(value);
        if expanded.is_absolute() {
            expanded
        } else {
            self.base_dir().join(expanded)
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(value)
}

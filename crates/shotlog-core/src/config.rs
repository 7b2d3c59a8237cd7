//! Shot logger configuration.

use crate::editor::EditorOptions;
use crate::gesture::GestureConfig;
use crate::table::TableGeometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a [`crate::Session`] needs to know up front.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotLogConfig {
    pub table: TableGeometry,
    pub gesture: GestureConfig,
    pub editor: EditorOptions,
}

impl ShotLogConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check that the values describe a usable table and sane timings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(ConfigError::Invalid)?;
        let gesture = &self.gesture;
        if gesture.long_press_ms == 0 {
            return Err(ConfigError::Invalid("long press must be longer than 0 ms".to_string()));
        }
        if !(gesture.tap_slop >= 0.0 && gesture.hit_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(
                "tap slop and hit tolerance must be non-negative".to_string(),
            ));
        }
        if !(self.editor.path_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(
                "path tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

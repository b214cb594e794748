// Chart configuration
// Grid resolution, trailing margin, and column table as named, loadable values

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::groove::ColumnMapKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings shared by every chart built in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Duration of one grid step in seconds
    /// 0.05 = 50ms steps (20 Hz refresh on the game board)
    pub step_duration: f64,

    /// Time appended after the last note, in seconds
    pub trailing_margin: f64,

    /// Pitch partition used to assign columns
    pub column_map: ColumnMapKind,

    /// Largest grid the builder will allocate
    pub max_steps: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            step_duration: 0.05,
            trailing_margin: 5.0,
            column_map: ColumnMapKind::Standard,
            max_steps: 1 << 20,
        }
    }
}

impl ChartConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = ChartConfig::from_json_str(&contents)?;
        log::info!("Loaded chart config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> ConfigResult<Self> {
        let config: ChartConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "step_duration must be a positive number of seconds, got {}",
                self.step_duration
            )));
        }
        if !(self.trailing_margin.is_finite() && self.trailing_margin >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trailing_margin must be zero or positive, got {}",
                self.trailing_margin
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be at least 1".into()));
        }
        Ok(())
    }

    pub fn step_duration_ms(&self) -> f64 {
        self.step_duration * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ChartConfig::default();
        assert_eq!(config.step_duration, 0.05);
        assert_eq!(config.trailing_margin, 5.0);
        assert_eq!(config.column_map, ColumnMapKind::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ChartConfig::from_json_str(r#"{"step_duration": 0.1, "column_map": "wide"}"#)
            .unwrap();

        assert_eq!(config.step_duration, 0.1);
        assert_eq!(config.trailing_margin, 5.0);
        assert_eq!(config.column_map, ColumnMapKind::Wide);
    }

    #[test]
    fn test_invalid_step_duration_rejected() {
        let result = ChartConfig::from_json_str(r#"{"step_duration": 0.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = ChartConfig::from_json_str(r#"{"trailing_margin": -1.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = ChartConfig::from_json_str("{ step_duration");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"trailing_margin": 2.5, "max_steps": 4096}}"#).unwrap();

        let config = ChartConfig::load(file.path()).unwrap();
        assert_eq!(config.trailing_margin, 2.5);
        assert_eq!(config.max_steps, 4096);
    }
}

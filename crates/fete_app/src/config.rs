//! Fete configuration file handling
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [viewport]
//! width = 1280.0
//! height = 720.0
//!
//! [display]
//! refresh_rate = 60.0
//!
//! [confetti]
//! amount = 300.0
//! max_fps = 60.0
//! seed = 42
//! ```

use std::fs;
use std::path::Path;

use fete_animation::{DEFAULT_MAX_FPS, MAX_PIECES};
use serde::{Deserialize, Serialize};

use crate::error::{FeteError, Result};

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FeteConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub confetti: ConfettiConfig,
}

/// Size of the simulated browser window
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    720.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Frame delivery
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Refreshes per second
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: f64,
}

fn default_refresh_rate() -> f64 {
    60.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_rate: default_refresh_rate(),
        }
    }
}

/// The welcome page's confetti burst
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ConfettiConfig {
    /// Number of pieces (floored)
    #[serde(default = "default_amount")]
    pub amount: f32,
    /// Cap on particle updates per second
    #[serde(default = "default_max_fps")]
    pub max_fps: f64,
    /// Fixed random seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_amount() -> f32 {
    300.0
}

fn default_max_fps() -> f64 {
    DEFAULT_MAX_FPS
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            amount: default_amount(),
            max_fps: default_max_fps(),
            seed: None,
        }
    }
}

impl FeteConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FeteError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FeteConfig =
            toml::from_str(&content).map_err(|source| FeteError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        tracing::debug!("FeteConfig: loaded {}", path.display());
        Ok(config)
    }

    /// Reject values the app cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64| value.is_finite() && value > 0.0;

        if !positive(self.viewport.width as f64) || !positive(self.viewport.height as f64) {
            return Err(FeteError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if !positive(self.display.refresh_rate) {
            return Err(FeteError::InvalidConfig(format!(
                "refresh_rate must be positive, got {}",
                self.display.refresh_rate
            )));
        }
        if !positive(self.confetti.max_fps) {
            return Err(FeteError::InvalidConfig(format!(
                "max_fps must be positive, got {}",
                self.confetti.max_fps
            )));
        }
        let amount = self.confetti.amount;
        if !amount.is_finite() || amount < 0.0 || amount.floor() as usize > MAX_PIECES {
            return Err(FeteError::InvalidConfig(format!(
                "amount must be between 0 and {}, got {}",
                MAX_PIECES, amount
            )));
        }
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> FeteConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config, FeteConfig::default());
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.display.refresh_rate, 60.0);
        assert_eq!(config.confetti.amount, 300.0);
        assert_eq!(config.confetti.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_tables() {
        let config = parse(
            r#"
            [viewport]
            width = 800.0

            [confetti]
            seed = 7
            "#,
        );
        assert_eq!(config.viewport.width, 800.0);
        assert_eq!(config.viewport.height, 720.0);
        assert_eq!(config.confetti.seed, Some(7));
        assert_eq!(config.confetti.max_fps, DEFAULT_MAX_FPS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = FeteConfig::default();
        config.display.refresh_rate = 0.0;
        assert!(matches!(config.validate(), Err(FeteError::InvalidConfig(_))));

        let mut config = FeteConfig::default();
        config.confetti.amount = -1.0;
        assert!(config.validate().is_err());

        let mut config = FeteConfig::default();
        config.viewport.height = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = FeteConfig::default();
        config.confetti.max_fps = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_amount_upper_bound() {
        let mut config = FeteConfig::default();
        config.confetti.amount = MAX_PIECES as f32;
        assert!(config.validate().is_ok());

        config.confetti.amount = 1e30;
        assert!(matches!(config.validate(), Err(FeteError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = FeteConfig::default();
        config.confetti.seed = Some(99);
        let content = config.to_toml().unwrap();
        assert_eq!(parse(&content), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FeteConfig::load("/definitely/not/here/fete.toml").unwrap_err();
        assert!(matches!(err, FeteError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("fete-config-{}.toml", std::process::id()));
        fs::write(&path, "[display]\nrefresh_rate = \"fast\"\n").unwrap();
        let err = FeteConfig::load(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, FeteError::ConfigParse { .. }));
    }
}

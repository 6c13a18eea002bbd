//! Caller-adjustable tuning knobs for a recommendation request, persisted as TOML.

use crate::combine::BlendWeights;
use crate::predict::ObjectiveWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ALPHA: f64 = 0.1;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML config file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Significance threshold alpha must lie in (0, 1], got {0}.")]
    InvalidAlpha(f64),
    #[error("Weight '{name}' must be a finite, non-negative number, got {value}.")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("At least one of the blend weights must be positive.")]
    DegenerateBlend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// A coefficient survives masking only if its p-value is strictly below this.
    pub alpha: f64,
    pub objective: ObjectiveWeights,
    pub blend: BlendWeights,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            objective: ObjectiveWeights::default(),
            blend: BlendWeights::default(),
        }
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { name, value })
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        check_weight("objective.intrinsic", self.objective.intrinsic)?;
        check_weight("objective.extrinsic", self.objective.extrinsic)?;
        check_weight("objective.amotivation", self.objective.amotivation)?;
        check_weight("blend.hexad", self.blend.hexad)?;
        check_weight("blend.motivation", self.blend.motivation)?;
        if self.blend.hexad == 0.0 && self.blend.motivation == 0.0 {
            return Err(ConfigError::DegenerateBlend);
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Saves the config in a human-readable TOML format.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_string = self.to_toml_string()?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Loads and validates a config. Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml_string = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&toml_string)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_documented_constants() {
        let config = RecommenderConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.objective.intrinsic, 1.0);
        assert_eq!(config.objective.extrinsic, 1.0);
        assert_eq!(config.objective.amotivation, 1.0);
        assert_eq!(config.blend.hexad, 0.5);
        assert_eq!(config.blend.motivation, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: RecommenderConfig =
            toml::from_str("alpha = 0.05\n[blend]\nhexad = 0.8\n").unwrap();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.blend.hexad, 0.8);
        assert_eq!(config.blend.motivation, 0.5);
        assert_eq!(config.objective, ObjectiveWeights::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gamaffinity.toml");
        let mut config = RecommenderConfig::default();
        config.alpha = 0.05;
        config.objective.amotivation = 2.0;
        config.save(&path).unwrap();

        assert_eq!(RecommenderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = RecommenderConfig::default();
        config.alpha = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAlpha(_))));

        let mut config = RecommenderConfig::default();
        config.objective.extrinsic = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                name: "objective.extrinsic",
                ..
            })
        ));

        let mut config = RecommenderConfig::default();
        config.blend = BlendWeights {
            hexad: 0.0,
            motivation: 0.0,
        };
        assert!(matches!(config.validate(), Err(ConfigError::DegenerateBlend)));
    }
}

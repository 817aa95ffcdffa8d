use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::training::SamplingMode;

/// Compute backend the policy runs on. The binary maps this to a concrete
/// Burn backend type and hands the device to the agent constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ComputeBackend {
    /// CPU via ndarray
    #[default]
    Ndarray,
    /// GPU via wgpu
    Wgpu,
}

/// Flat application configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board_size: usize,
    pub episodes: usize,
    pub learning_rate: f64,
    pub save_dir: PathBuf,
    pub backend: ComputeBackend,
    pub sampling: SamplingMode,
    /// Fixed RNG seed; drawn from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub log_interval: usize,
    /// Merge an existing artifact for this board size before training.
    pub warm_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            board_size: 15,
            episodes: 1000,
            learning_rate: 0.002,
            save_dir: PathBuf::from("models"),
            backend: ComputeBackend::default(),
            sampling: SamplingMode::default(),
            seed: None,
            log_interval: 100,
            warm_start: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE || self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::Validation(format!(
                "board_size must be in [{MIN_BOARD_SIZE}, {MAX_BOARD_SIZE}]"
            )));
        }
        if self.episodes == 0 {
            return Err(ConfigError::Validation("episodes must be > 0".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "learning_rate must be a finite value > 0".into(),
            ));
        }
        if self.log_interval == 0 {
            return Err(ConfigError::Validation("log_interval must be > 0".into()));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

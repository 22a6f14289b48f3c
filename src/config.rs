//! YAML configuration file support for neardup.
//!
//! All stage settings live in one YAML document that is loaded at startup
//! and converted into a [`DedupConfig`]. Every field has a default, so an
//! empty document yields the same settings as `DedupConfig::default()`.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "news dedup"
//!
//! features:
//!   ngram_size: 3
//!   num_features: 262144
//!
//! minhash:
//!   num_hashes: 13
//!   seed: 1
//!
//! matcher:
//!   threshold: 0.3
//!   use_parallel: false
//!   strategy:
//!     type: exhaustive
//!
//! log_level: "info"
//!
//! output:
//!   format: "text"
//!   json_logs: false
//! ```

use std::fs;
use std::path::Path;

use matcher::{DedupConfig, ScanStrategy, DEFAULT_THRESHOLD};
use perceptual::{DEFAULT_NGRAM_SIZE, DEFAULT_NUM_FEATURES, DEFAULT_NUM_HASHES, DEFAULT_SEED};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NeardupConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub features: FeatureYamlConfig,

    #[serde(default)]
    pub minhash: MinHashYamlConfig,

    #[serde(default)]
    pub matcher: MatchYamlConfig,

    /// `EnvFilter` directive, e.g. `info` or `matcher=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl NeardupConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NeardupConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.features.validate()?;
        self.minhash.validate()?;
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".to_string(),
            ));
        }
        self.to_dedup_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;

        Ok(())
    }

    /// Flatten the stage sections into the matcher's config.
    pub fn to_dedup_config(&self) -> DedupConfig {
        DedupConfig {
            ngram_size: self.features.ngram_size,
            num_hashes: self.minhash.num_hashes,
            threshold: self.matcher.threshold,
            num_features: self.features.num_features,
            seed: self.minhash.seed,
            use_parallel: self.matcher.use_parallel,
            strategy: self.matcher.strategy,
        }
    }
}

impl Default for NeardupConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            features: FeatureYamlConfig::default(),
            minhash: MinHashYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
            log_level: default_log_level(),
            output: OutputYamlConfig::default(),
        }
    }
}

/// Feature extraction YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureYamlConfig {
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,

    #[serde(default = "default_num_features")]
    pub num_features: u32,
}

impl FeatureYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.ngram_size == 0 {
            return Err(ConfigLoadError::Validation(
                "features.ngram_size must be >= 1".to_string(),
            ));
        }
        if self.num_features == 0 {
            return Err(ConfigLoadError::Validation(
                "features.num_features must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FeatureYamlConfig {
    fn default() -> Self {
        Self {
            ngram_size: default_ngram_size(),
            num_features: default_num_features(),
        }
    }
}

/// MinHash YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinHashYamlConfig {
    #[serde(default = "default_num_hashes")]
    pub num_hashes: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl MinHashYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.num_hashes == 0 {
            return Err(ConfigLoadError::Validation(
                "minhash.num_hashes must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MinHashYamlConfig {
    fn default() -> Self {
        Self {
            num_hashes: default_num_hashes(),
            seed: default_seed(),
        }
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchYamlConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub use_parallel: bool,

    #[serde(default)]
    pub strategy: ScanStrategy,
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            use_parallel: false,
            strategy: ScanStrategy::Exhaustive,
        }
    }
}

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

fn default_format_version() -> String {
    "1.0".to_string()
}

fn default_ngram_size() -> usize {
    DEFAULT_NGRAM_SIZE
}

fn default_num_features() -> u32 {
    DEFAULT_NUM_FEATURES
}

fn default_num_hashes() -> usize {
    DEFAULT_NUM_HASHES
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}

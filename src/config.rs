//! YAML configuration file support for the FLoC simulator.
//!
//! Every field is optional; a missing file section falls back to the Chrome
//! defaults. Command-line flags override whatever the file sets.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! host_list: "host_list.json"
//! sorting_lsh_clusters: "SortingLshClusters"
//!
//! floc:
//!   version: 1
//!   bits: 50
//!   use_parallel: false
//!
//! output:
//!   format: "decimal"
//!   cohort: false
//!
//! log_level: "warn"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use floc::{FlocConfig, SetupPaths, SimHashFormat, MAX_NUMBER_OF_BITS_IN_FLOC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default host list, relative to the working directory.
pub const DEFAULT_HOST_LIST: &str = "host_list.json";

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

/// Top-level simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulatorConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Host-list JSON file
    #[serde(default = "default_host_list")]
    pub host_list: PathBuf,

    /// Sorting-LSH cluster file; cluster data is empty when unset
    #[serde(default)]
    pub sorting_lsh_clusters: Option<PathBuf>,

    #[serde(default)]
    pub floc: FlocYamlConfig,

    #[serde(default)]
    pub output: OutputYamlConfig,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl SimulatorConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SimulatorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.host_list.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "host_list must not be empty".to_string(),
            ));
        }

        self.floc.validate()
    }

    /// Files to hand to [`floc::setup`].
    pub fn setup_paths(&self) -> SetupPaths {
        SetupPaths {
            host_list: self.host_list.clone(),
            sorting_lsh_clusters: self.sorting_lsh_clusters.clone(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            host_list: default_host_list(),
            sorting_lsh_clusters: None,
            floc: FlocYamlConfig::default(),
            output: OutputYamlConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Algorithm section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlocYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_bits")]
    pub bits: u8,

    #[serde(default)]
    pub use_parallel: bool,
}

impl FlocYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_floc_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("floc: {err}")))
    }

    pub fn to_floc_config(&self) -> FlocConfig {
        FlocConfig {
            version: self.version,
            bits: self.bits,
            use_parallel: self.use_parallel,
        }
    }
}

impl Default for FlocYamlConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            bits: default_bits(),
            use_parallel: false,
        }
    }
}

/// What the single stdout line contains
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub format: SimHashFormat,

    /// Print the sorting-LSH cohort instead of the sim hash
    #[serde(default)]
    pub cohort: bool,
}

fn default_config_version() -> String {
    "1.0".to_string()
}
fn default_host_list() -> PathBuf {
    PathBuf::from(DEFAULT_HOST_LIST)
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_version() -> u32 {
    1
}
fn default_bits() -> u8 {
    MAX_NUMBER_OF_BITS_IN_FLOC
}

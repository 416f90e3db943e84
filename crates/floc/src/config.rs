//! Configuration and error types for FLoC cohort simulation.
//!
//! [`FlocConfig`] is the whole algorithmic surface: how many sim-hash bits to
//! keep and whether dimensions are accumulated in parallel. Nothing here reads
//! the environment, so the hash stays a pure function of
//! `(domains, config)`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of sim-hash bits Chrome keeps for a FLoC cohort.
pub const MAX_NUMBER_OF_BITS_IN_FLOC: u8 = 50;

/// Widest sim hash a `u64` can carry.
pub const MAX_SIM_HASH_BITS: u8 = 64;

/// Algorithm configuration for sim-hash and cohort computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlocConfig {
    /// Configuration schema version.
    ///
    /// Bump on any change that can alter a computed sim hash.
    pub version: u32,
    /// Output width of the sim hash in bits (`1..=64`).
    pub bits: u8,
    /// Accumulate output dimensions on the rayon pool.
    ///
    /// Results are bit-identical to the sequential path.
    pub use_parallel: bool,
}

impl FlocConfig {
    /// Create a new configuration with the Chrome defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sim-hash width in bits.
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Enable or disable parallel accumulation.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), FlocError> {
        if self.version < 1 {
            return Err(FlocError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.bits == 0 || self.bits > MAX_SIM_HASH_BITS {
            return Err(FlocError::InvalidConfigBits { bits: self.bits });
        }
        Ok(())
    }
}

impl Default for FlocConfig {
    fn default() -> Self {
        Self {
            version: 1,
            bits: MAX_NUMBER_OF_BITS_IN_FLOC,
            use_parallel: false,
        }
    }
}

/// Errors returned by setup and cohort computation.
#[derive(Debug, Error)]
pub enum FlocError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse host list {}: {source}", .path.display())]
    HostListParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("host list entry {index} is empty")]
    EmptyDomain { index: usize },

    #[error("invalid config: bits must be in 1..=64 (got {bits})")]
    InvalidConfigBits { bits: u8 },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("sorting-lsh clusters are malformed at entry {index}: {reason}")]
    ClusterDecode { index: usize, reason: &'static str },

    #[error("sim hash {sim_hash} does not fall inside any sorting-lsh cluster")]
    NoMatchingCluster { sim_hash: u64 },

    #[error("cohort {index} is blocked")]
    BlockedCohort { index: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = FlocConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.bits, 50);
        assert!(!cfg.use_parallel);
    }

    #[test]
    fn config_builder_chain() {
        let cfg = FlocConfig::new().with_bits(16).with_parallel(true);
        assert_eq!(cfg.bits, 16);
        assert!(cfg.use_parallel);
    }

    #[test]
    fn config_validate_valid() {
        assert!(FlocConfig::default().validate().is_ok());
        assert!(FlocConfig::new().with_bits(1).validate().is_ok());
        assert!(FlocConfig::new().with_bits(64).validate().is_ok());
    }

    #[test]
    fn config_validate_rejects_zero_bits() {
        assert!(matches!(
            FlocConfig::new().with_bits(0).validate(),
            Err(FlocError::InvalidConfigBits { bits: 0 })
        ));
    }

    #[test]
    fn config_validate_rejects_wide_bits() {
        assert!(matches!(
            FlocConfig::new().with_bits(65).validate(),
            Err(FlocError::InvalidConfigBits { bits: 65 })
        ));
    }

    #[test]
    fn config_validate_rejects_version_zero() {
        let cfg = FlocConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(FlocError::InvalidConfigVersion { version: 0 })
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = FlocConfig::new().with_bits(20).with_parallel(true);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: FlocConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn error_display_mentions_path() {
        let err = FlocError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.json"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn error_display_blocked_cohort() {
        let err = FlocError::BlockedCohort { index: 7 };
        assert_eq!(err.to_string(), "cohort 7 is blocked");
    }
}

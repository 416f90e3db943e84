//! # FLoC cohort simulation
//!
//! This crate reproduces the browser-side half of Federated Learning of
//! Cohorts: turning a browsing history (a list of visited hosts) into a
//! locality-sensitive sim hash, and mapping that hash to a cohort through the
//! sorting-LSH cluster table.
//!
//! ## Pipeline
//!
//! 1.  **Setup**: [`setup`] loads the host list (JSON) and the raw
//!     sorting-LSH cluster bytes.
//! 2.  **SimHash**: every host is hashed to a 64-bit feature with CityHash64.
//!     Each of the `bits` output dimensions is a random Gaussian hyperplane
//!     keyed by `(dimension, feature)`; a bit is set when the projection of
//!     the feature set onto its hyperplane is positive. Similar histories
//!     share most bits.
//! 3.  **Sorting LSH** (optional): [`compute_cohort`] walks the cluster table
//!     until the cumulative cluster size passes the sim hash.
//!
//! Invariant: for the same host set and the same [`FlocConfig`], the sim hash
//! is bit identical. Host order and repeated hosts do not matter.
//!
//! ## Example Usage
//!
//! ```
//! use floc::{sim_hash, DomainList, FlocConfig};
//!
//! let domains = DomainList::new(["example.com", "example.org"]).unwrap();
//! let hash = sim_hash(&domains, &FlocConfig::default()).unwrap();
//!
//! assert_eq!(hash.bits, 50);
//! assert!(hash.value < 1 << 50);
//! ```
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, Level};

pub mod cityhash;
pub mod config;
pub mod domains;
pub mod fingerprint;
pub mod simhash;
pub mod sorting_lsh;

pub use crate::config::{FlocConfig, FlocError, MAX_NUMBER_OF_BITS_IN_FLOC, MAX_SIM_HASH_BITS};
pub use crate::domains::{normalize_domain, DomainList};
pub use crate::fingerprint::{CohortId, SimHash, SimHashFormat};
pub use crate::simhash::{sim_hash_bits, sim_hash_strings, WeightedFeatures};
pub use crate::sorting_lsh::{SortingLshCluster, SortingLshClusters};

/// Human-readable algorithm identifier.
pub const FLOC_ALGORITHM: &str = "cityhash64_gaussian_simhash_v1";

/// Files consumed by [`setup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPaths {
    /// Host-list JSON.
    pub host_list: PathBuf,
    /// Sorting-LSH cluster file. `None` loads an empty table.
    pub sorting_lsh_clusters: Option<PathBuf>,
}

impl SetupPaths {
    pub fn new(host_list: impl Into<PathBuf>) -> Self {
        Self {
            host_list: host_list.into(),
            sorting_lsh_clusters: None,
        }
    }

    pub fn with_sorting_lsh_clusters(mut self, path: impl Into<PathBuf>) -> Self {
        self.sorting_lsh_clusters = Some(path.into());
        self
    }
}

/// Load the host list and the sorting-LSH cluster data.
pub fn setup(paths: &SetupPaths) -> Result<(DomainList, SortingLshClusters), FlocError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "floc.setup",
        host_list = %paths.host_list.display()
    );
    let _guard = span.enter();

    match setup_inner(paths) {
        Ok((domains, clusters)) => {
            info!(
                domain_count = domains.len(),
                cluster_bytes = clusters.byte_len(),
                elapsed_micros = start.elapsed().as_micros(),
                "setup_success"
            );
            Ok((domains, clusters))
        }
        Err(err) => {
            debug!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "setup_failure"
            );
            Err(err)
        }
    }
}

fn setup_inner(paths: &SetupPaths) -> Result<(DomainList, SortingLshClusters), FlocError> {
    let domains = DomainList::from_file(&paths.host_list)?;
    let clusters = match &paths.sorting_lsh_clusters {
        Some(path) => SortingLshClusters::from_file(path)?,
        None => SortingLshClusters::empty(),
    };
    Ok((domains, clusters))
}

/// Compute the sim hash of a domain list under `cfg`.
pub fn sim_hash(domains: &DomainList, cfg: &FlocConfig) -> Result<SimHash, FlocError> {
    cfg.validate()?;
    let value = sim_hash_strings(domains.as_slice(), cfg.bits, cfg.use_parallel);
    debug!(
        algorithm = FLOC_ALGORITHM,
        domain_count = domains.len(),
        bits = cfg.bits,
        sim_hash = value,
        "simhash_computed"
    );
    Ok(SimHash::new(value, cfg.bits))
}

/// Sim hash of `domains` at `bits` width, as a decimal string.
///
/// Widths above 64 are treated as 64.
pub fn sim_hash_string<S: AsRef<str>>(domains: &[S], bits: u8) -> String {
    sim_hash_strings(domains, bits, false).to_string()
}

/// Sim-hash the domains and look the result up in the cluster table.
pub fn compute_cohort(
    domains: &DomainList,
    clusters: &SortingLshClusters,
    cfg: &FlocConfig,
) -> Result<CohortId, FlocError> {
    let hash = sim_hash(domains, cfg)?;
    let cohort = clusters.cohort_id(hash.value, cfg.bits)?;
    debug!(sim_hash = hash.value, cohort = cohort.0, "cohort_computed");
    Ok(cohort)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_hash_string_matches_sim_hash() {
        let domains = DomainList::new(["example.com", "example.org"]).unwrap();
        let hash = sim_hash(&domains, &FlocConfig::default()).unwrap();
        assert_eq!(
            sim_hash_string(domains.as_slice(), MAX_NUMBER_OF_BITS_IN_FLOC),
            hash.value.to_string()
        );
    }

    #[test]
    fn sim_hash_rejects_invalid_config() {
        let domains = DomainList::new(["example.com"]).unwrap();
        let cfg = FlocConfig::new().with_bits(0);
        assert!(matches!(
            sim_hash(&domains, &cfg),
            Err(FlocError::InvalidConfigBits { bits: 0 })
        ));
    }

    #[test]
    fn setup_loads_host_list_and_clusters() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("host_list.json");
        let clusters = dir.path().join("SortingLshClusters");
        std::fs::write(&hosts, r#"{"domains": ["a.com", "b.com"]}"#).unwrap();
        std::fs::write(&clusters, [0x02, 0x03]).unwrap();

        let paths = SetupPaths::new(&hosts).with_sorting_lsh_clusters(&clusters);
        let (domains, data) = setup(&paths).unwrap();
        assert_eq!(domains.as_slice(), ["a.com", "b.com"]);
        assert_eq!(data.as_bytes(), &[0x02, 0x03]);
    }

    #[test]
    fn setup_without_cluster_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("host_list.json");
        std::fs::write(&hosts, "[]").unwrap();
        let (domains, data) = setup(&SetupPaths::new(&hosts)).unwrap();
        assert!(domains.is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn setup_missing_cluster_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("host_list.json");
        std::fs::write(&hosts, "[]").unwrap();
        let paths = SetupPaths::new(&hosts).with_sorting_lsh_clusters(dir.path().join("nope"));
        assert!(matches!(setup(&paths), Err(FlocError::Io { .. })));
    }

    #[test]
    fn compute_cohort_finds_cluster() {
        let domains = DomainList::new(["example.com"]).unwrap();
        let cfg = FlocConfig::new().with_bits(4);
        let hash = sim_hash(&domains, &cfg).unwrap();
        // Sixteen single-hash clusters: the cohort is the hash itself.
        let clusters = SortingLshClusters::from_clusters(&[SortingLshCluster::new(0, false); 16]);
        assert_eq!(
            compute_cohort(&domains, &clusters, &cfg).unwrap(),
            CohortId(hash.value)
        );
    }
}

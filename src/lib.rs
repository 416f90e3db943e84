//! Umbrella crate for the FLoC simulator.
//!
//! This crate sequences one invocation: load the host list and the
//! sorting-LSH clusters, hash the hosts, print one line. The loading and
//! hashing steps sit behind the [`Setup`] and [`DomainHasher`] traits so the
//! sequence can run against stubs.

pub mod cli;
pub mod config;

use std::io::{self, Write};

use thiserror::Error;
use tracing::info;

pub use crate::cli::{Cli, OutputFormat};
pub use crate::config::{ConfigLoadError, SimulatorConfig, DEFAULT_HOST_LIST};
pub use floc::{
    compute_cohort, setup, sim_hash, sim_hash_string, CohortId, DomainList, FlocConfig,
    FlocError, SetupPaths, SimHash, SimHashFormat, SortingLshClusters,
    MAX_NUMBER_OF_BITS_IN_FLOC,
};

/// Errors that end a simulator run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("setup failed: {0}")]
    Setup(FlocError),

    #[error("cohort computation failed: {0}")]
    Cohort(FlocError),

    #[error("failed to write result: {0}")]
    Output(#[from] io::Error),
}

/// Produces the domain list and the cluster data.
pub trait Setup {
    fn setup(&self) -> Result<(DomainList, SortingLshClusters), FlocError>;
}

/// Turns a domain list into the printed sim-hash string.
pub trait DomainHasher {
    fn sim_hash(&self, domains: &DomainList, bits: u8) -> String;
}

/// [`Setup`] backed by files on disk.
#[derive(Debug, Clone)]
pub struct FileSetup {
    paths: SetupPaths,
}

impl FileSetup {
    pub fn new(paths: SetupPaths) -> Self {
        Self { paths }
    }
}

impl Setup for FileSetup {
    fn setup(&self) -> Result<(DomainList, SortingLshClusters), FlocError> {
        floc::setup(&self.paths)
    }
}

/// [`DomainHasher`] running the FLoC sim hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimHasher {
    pub format: SimHashFormat,
    pub use_parallel: bool,
}

impl DomainHasher for SimHasher {
    fn sim_hash(&self, domains: &DomainList, bits: u8) -> String {
        let bits = bits.min(floc::MAX_SIM_HASH_BITS);
        let value = floc::sim_hash_strings(domains.as_slice(), bits, self.use_parallel);
        SimHash::new(value, bits).render(self.format)
    }
}

/// Run setup, leaving the failure for the caller to report.
fn load<S: Setup + ?Sized>(setup: &S) -> Result<(DomainList, SortingLshClusters), RunError> {
    setup.setup().map_err(RunError::Setup)
}

/// Setup, hash, print. The cluster data is loaded but not consulted.
///
/// Nothing is written to `out` when setup fails, and the hasher is not
/// called.
pub fn run_with<S, H, W>(setup: &S, hasher: &H, bits: u8, out: &mut W) -> Result<(), RunError>
where
    S: Setup + ?Sized,
    H: DomainHasher + ?Sized,
    W: Write + ?Sized,
{
    let (domains, _clusters) = load(setup)?;

    let hash = hasher.sim_hash(&domains, bits);
    writeln!(out, "{hash}")?;
    Ok(())
}

/// Setup, hash, look up the cohort, print the cohort id.
pub fn run_cohort_with<S, W>(setup: &S, cfg: &FlocConfig, out: &mut W) -> Result<(), RunError>
where
    S: Setup + ?Sized,
    W: Write + ?Sized,
{
    let (domains, clusters) = load(setup)?;

    let cohort = compute_cohort(&domains, &clusters, cfg).map_err(RunError::Cohort)?;
    info!(cohort = cohort.0, "cohort_assigned");
    writeln!(out, "{cohort}")?;
    Ok(())
}

/// Run the simulator as configured, writing the single result line to `out`.
pub fn run<W: Write + ?Sized>(config: &SimulatorConfig, out: &mut W) -> Result<(), RunError> {
    let setup = FileSetup::new(config.setup_paths());
    let floc_cfg = config.floc.to_floc_config();

    if config.output.cohort {
        return run_cohort_with(&setup, &floc_cfg, out);
    }

    let hasher = SimHasher {
        format: config.output.format,
        use_parallel: floc_cfg.use_parallel,
    };
    run_with(&setup, &hasher, floc_cfg.bits, out)
}

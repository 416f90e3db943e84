//! CLI argument parsing for the FLoC simulator

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use floc::SimHashFormat;

use crate::config::{ConfigLoadError, SimulatorConfig};

/// Text form of the printed sim hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Base-10 integer (default)
    Decimal,
    /// Base-2, zero-padded to the hash width
    Binary,
}

impl From<OutputFormat> for SimHashFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Decimal => SimHashFormat::Decimal,
            OutputFormat::Binary => SimHashFormat::Binary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "floc-simulator")]
#[command(version)]
#[command(about = "Compute a FLoC sim hash from a browsing-history host list", long_about = None)]
pub struct Cli {
    /// Host-list JSON file [default: host_list.json]
    #[arg(value_name = "HOST_LIST")]
    pub host_list: Option<PathBuf>,

    /// Sorting-LSH cluster file
    #[arg(long = "clusters", value_name = "PATH")]
    pub clusters: Option<PathBuf>,

    /// YAML configuration file; flags override its values
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sim-hash width in bits [default: 50]
    #[arg(long = "bits", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=64))]
    pub bits: Option<u8>,

    /// Output format for the sim hash
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Print the sorting-LSH cohort id instead of the sim hash
    #[arg(long = "cohort")]
    pub cohort: bool,

    /// Accumulate sim-hash dimensions on all cores
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Log debug events to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides on top.
    pub fn resolve(&self) -> Result<SimulatorConfig, ConfigLoadError> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::from_file(path)?,
            None => SimulatorConfig::default(),
        };

        if let Some(host_list) = &self.host_list {
            config.host_list = host_list.clone();
        }
        if let Some(clusters) = &self.clusters {
            config.sorting_lsh_clusters = Some(clusters.clone());
        }
        if let Some(bits) = self.bits {
            config.floc.bits = bits;
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if self.cohort {
            config.output.cohort = true;
        }
        if self.parallel {
            config.floc.use_parallel = true;
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

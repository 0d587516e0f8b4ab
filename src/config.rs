//! Runtime configuration for the vanity address generator.

use std::path::PathBuf;

use clap::Parser;

use crate::crypto::Network;
use crate::matcher::{Needle, NeedleError};

/// NEM Vanity Address Generator
///
/// Searches for a keypair whose account address contains NEEDLE. Private
/// keys are printed byte-reversed, the form NEM wallets import.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "EXAMPLES:\n  nem_vanity foo\n  nem_vanity --test-file testkeys.dat\n  nem_vanity --skip-self-test bar"
)]
pub struct Config {
    /// Substring to search for (base32 characters only: A-Z, 2-7; case insensitive)
    pub needle: Option<String>,

    /// Verify key derivation against a file of test vectors and exit
    #[arg(long, value_name = "FILE")]
    pub test_file: Option<PathBuf>,

    /// Skip the built-in self test
    #[arg(long, default_value = "false")]
    pub skip_self_test: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Stop after finding N addresses (0 = run until interrupted)
    #[arg(short = 'n', long, default_value = "0")]
    pub count: usize,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "1")]
    pub report_interval: u64,

    /// Address network: mainnet, testnet or mijin
    #[arg(long, default_value = "mainnet")]
    pub network: Network,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validates the configuration, returning the parsed needle if one was
    /// given.
    pub fn validate(&self) -> Result<Option<Needle>, ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        self.needle
            .as_deref()
            .map(Needle::parse)
            .transpose()
            .map_err(ConfigError::InvalidNeedle)
    }

    /// Returns true when there is nothing to do but print usage.
    pub fn is_empty(&self) -> bool {
        self.needle.is_none() && self.test_file.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidNeedle(#[from] NeedleError),

    #[error("Worker count must be at least 1")]
    InvalidWorkers,

    #[error("Report interval must be at least 1 second")]
    InvalidReportInterval,
}

//! Configuration module
//!
//! Handles CLI argument parsing, the optional TOML configuration file, and
//! validation. Everything here runs before the device is opened: a configuration
//! error never touches the device.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::engine::OperationType;
use crate::stats::IterationBudget;
use crate::util::buffer::FillPattern;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default transfer size in bytes
pub const DEFAULT_BLOCK_SIZE: u64 = 4096;

/// Default interval between reports
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Report line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Mean latency only
    Simple,
    /// Timestamp, mean latency and raw totals
    #[default]
    Verbose,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Simple => write!(f, "simple"),
            OutputMode::Verbose => write!(f, "verbose"),
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Block device to operate on
    pub device: PathBuf,
    /// Read or write
    pub op_type: OperationType,
    /// Bytes per operation
    pub block_size: usize,
    /// Number of reports before exiting (None = run until killed)
    pub iterations: Option<u64>,
    /// Report line format
    pub output: OutputMode,
    /// Write buffer content (ignored for reads)
    pub write_pattern: FillPattern,
    /// Time between reports
    pub report_interval: Duration,
}

impl Config {
    /// Read-mode configuration with defaults for everything but the device
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            op_type: OperationType::Read,
            block_size: DEFAULT_BLOCK_SIZE as usize,
            iterations: None,
            output: OutputMode::default(),
            write_pattern: FillPattern::Random,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Iteration budget for this run
    pub fn budget(&self) -> Result<IterationBudget, ConfigError> {
        IterationBudget::from_iterations(self.iterations).ok_or(ConfigError::InvalidIterations(0))
    }

    /// Pattern the buffer must be filled with before the run, if any
    pub fn fill_pattern(&self) -> Option<FillPattern> {
        match self.op_type {
            OperationType::Write => Some(self.write_pattern),
            OperationType::Read => None,
        }
    }
}

/// Configuration errors
///
/// Every variant is detected before the device is opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Block device must be specified")]
    MissingDevice,

    #[error("Invalid buffer size {0}")]
    InvalidBlockSize(String),

    #[error("Iteration counter must be nonzero, got {0}")]
    InvalidIterations(i64),

    #[error("Report interval must be greater than 0")]
    ZeroInterval,
}

//! CLI to Config conversion utilities

use super::toml::FileConfig;
use super::{Config, ConfigError, OutputMode, DEFAULT_BLOCK_SIZE};
use crate::config::cli::Cli;
use crate::engine::OperationType;
use crate::util::buffer::FillPattern;

/// Parse a size string (e.g., "4096", "4k", "1M") to bytes
///
/// Zero, negative, malformed and overflowing values are all rejected.
pub fn parse_size(s: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidBlockSize(s.to_string());
    let lower = s.trim().to_lowercase();

    let kilo = lower.strip_suffix("kb").or(lower.strip_suffix('k'));
    let (num_str, multiplier) = if let Some(n) = kilo {
        (n, 1024u64)
    } else if let Some(n) = lower.strip_suffix("mb").or(lower.strip_suffix('m')) {
        (n, 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("gb").or(lower.strip_suffix('g')) {
        (n, 1024 * 1024 * 1024)
    } else {
        (lower.as_str(), 1)
    };

    let num: u64 = num_str.trim().parse().map_err(|_| invalid())?;
    let bytes = num.checked_mul(multiplier).ok_or_else(invalid)?;

    if bytes == 0 {
        return Err(invalid());
    }

    Ok(bytes)
}

/// Check a signed iteration count and convert it to the unsigned form
///
/// Zero is rejected. A negative count means no bound, the same as leaving it off.
pub fn convert_iterations(iterations: Option<i64>) -> Result<Option<u64>, ConfigError> {
    match iterations {
        None => Ok(None),
        Some(0) => Err(ConfigError::InvalidIterations(0)),
        Some(n) if n < 0 => Ok(None),
        Some(n) => Ok(Some(n as u64)),
    }
}

/// Build the run configuration from CLI arguments and an optional config file
///
/// Command-line values take precedence. A flag left off the command line falls
/// back to the file, then to the built-in default.
pub fn build_config(cli: &Cli, file: Option<&FileConfig>) -> Result<Config, ConfigError> {
    let empty = FileConfig::default();
    let file = file.unwrap_or(&empty);

    let device = cli
        .device
        .clone()
        .or_else(|| file.device.clone())
        .ok_or(ConfigError::MissingDevice)?;

    let block_size = match (&cli.block_size, &file.block_size) {
        (Some(s), _) => parse_size(s)?,
        (None, Some(size)) => size.to_bytes()?,
        (None, None) => DEFAULT_BLOCK_SIZE,
    };
    let block_size = usize::try_from(block_size)
        .map_err(|_| ConfigError::InvalidBlockSize(block_size.to_string()))?;

    let iterations = convert_iterations(cli.iterations.or(file.iterations))?;

    let output = if cli.simple {
        OutputMode::Simple
    } else {
        file.output.unwrap_or_default()
    };

    let op_type = if cli.write || file.write.unwrap_or(false) {
        OperationType::Write
    } else {
        OperationType::Read
    };

    let write_pattern = if cli.zeros || file.zeros.unwrap_or(false) {
        FillPattern::Zeros
    } else {
        FillPattern::Random
    };

    Ok(Config {
        device,
        op_type,
        block_size,
        iterations,
        output,
        write_pattern,
        ..Config::new("")
    })
}

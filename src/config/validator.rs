//! Configuration validation

use super::{Config, ConfigError};
use crate::engine::OperationType;
use crate::util::buffer::{page_size, FillPattern};

/// Validate complete configuration
///
/// Hard errors are returned; settings that are legal but likely to misbehave
/// are logged as warnings.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.device.as_os_str().is_empty() {
        return Err(ConfigError::MissingDevice);
    }

    if config.block_size == 0 {
        return Err(ConfigError::InvalidBlockSize(config.block_size.to_string()));
    }

    if let Some(0) = config.iterations {
        return Err(ConfigError::InvalidIterations(0));
    }

    if config.report_interval.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }

    warn_on_suspicious(config);

    Ok(())
}

fn warn_on_suspicious(config: &Config) {
    let page = page_size();
    if config.block_size % page != 0 {
        tracing::warn!(
            block_size = config.block_size,
            page_size = page,
            "block size is not a multiple of the page size; O_DIRECT transfers may fail"
        );
    }

    if config.op_type == OperationType::Read && config.write_pattern == FillPattern::Zeros {
        tracing::warn!("write-zeros requested without write mode; ignoring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_valid_default() {
        assert!(validate_config(&Config::new("/dev/sdb")).is_ok());
    }

    #[test]
    fn test_empty_device() {
        assert_eq!(
            validate_config(&Config::new("")),
            Err(ConfigError::MissingDevice)
        );
    }

    #[test]
    fn test_zero_block_size() {
        let mut config = Config::new("/dev/sdb");
        config.block_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidBlockSize(_))
        ));
    }

    #[test]
    fn test_zero_iterations() {
        let mut config = Config::new("/dev/sdb");
        config.iterations = Some(0);
        assert_eq!(
            validate_config(&config),
            Err(ConfigError::InvalidIterations(0))
        );
    }

    #[test]
    fn test_zero_interval() {
        let mut config = Config::new("/dev/sdb");
        config.report_interval = Duration::ZERO;
        assert_eq!(validate_config(&config), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn test_unaligned_block_size_is_only_a_warning() {
        let mut config = Config::new("/dev/sdb");
        config.block_size = 1000;
        assert!(validate_config(&config).is_ok());
    }
}

//! TOML configuration file parsing
//!
//! A config file supplies defaults for any command-line setting:
//!
//! ```toml
//! device = "/dev/nvme0n1"
//! block_size = "64k"     # or an integer byte count
//! output = "simple"      # or "verbose"
//! write = false
//! zeros = false
//! iterations = 60
//! ```

use super::cli_convert::parse_size;
use super::{ConfigError, OutputMode};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from a config file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<PathBuf>,
    pub block_size: Option<SizeValue>,
    pub output: Option<OutputMode>,
    pub write: Option<bool>,
    pub zeros: Option<bool>,
    pub iterations: Option<i64>,
}

/// Block size given either as a byte count or a size string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Bytes(i64),
    Text(String),
}

impl SizeValue {
    /// Resolve to a positive byte count
    pub fn to_bytes(&self) -> Result<u64, ConfigError> {
        match self {
            SizeValue::Bytes(n) if *n > 0 => Ok(*n as u64),
            SizeValue::Bytes(n) => Err(ConfigError::InvalidBlockSize(n.to_string())),
            SizeValue::Text(s) => parse_size(s),
        }
    }
}

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<FileConfig> {
    let config: FileConfig =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file() {
        assert_eq!(parse_toml_string("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = parse_toml_string(
            r#"
            device = "/dev/sdb"
            block_size = 512
            output = "verbose"
            write = true
            zeros = false
            iterations = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.device, Some(PathBuf::from("/dev/sdb")));
        assert_eq!(config.block_size, Some(SizeValue::Bytes(512)));
        assert_eq!(config.output, Some(OutputMode::Verbose));
        assert_eq!(config.write, Some(true));
        assert_eq!(config.zeros, Some(false));
        assert_eq!(config.iterations, Some(3));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_toml_string("queue_depth = 32").is_err());
    }

    #[test]
    fn test_unknown_output_mode_rejected() {
        assert!(parse_toml_string(r#"output = "json""#).is_err());
    }

    #[test]
    fn test_size_value() {
        assert_eq!(SizeValue::Bytes(4096).to_bytes(), Ok(4096));
        assert_eq!(SizeValue::Text("2k".into()).to_bytes(), Ok(2048));
        assert_eq!(
            SizeValue::Bytes(0).to_bytes(),
            Err(ConfigError::InvalidBlockSize("0".into()))
        );
        assert_eq!(
            SizeValue::Bytes(-8).to_bytes(),
            Err(ConfigError::InvalidBlockSize("-8".into()))
        );
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "block_size = \"16k\"").unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.block_size, Some(SizeValue::Text("16k".into())));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = parse_toml_file(Path::new("/nonexistent/blklat.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/blklat.toml"));
    }
}

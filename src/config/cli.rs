//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// Instant Disk Latency Measurement Tool
///
/// Issues one unbuffered read (or write) at a time against a block device and
/// prints the mean latency of the operations completed in each second.
#[derive(Parser, Debug)]
#[command(name = "blklat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Simple output: print latency only
    #[arg(short = 's', long)]
    pub simple: bool,

    /// Write instead of read. USE WITH CARE: overwrites the device
    #[arg(short = 'w', long)]
    pub write: bool,

    /// Write zeros instead of random data
    #[arg(short = 'z', long)]
    pub zeros: bool,

    /// Use SIZE bytes at a time (e.g., 4096, 4k, 1M) [default: 4096]
    #[arg(short = 'b', long, value_name = "SIZE", allow_hyphen_values = true)]
    pub block_size: Option<String>,

    /// Read defaults from a TOML file (command-line values take precedence)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    pub debug: bool,

    /// Block device to operate on
    #[arg(value_name = "DEV_NAME")]
    pub device: Option<PathBuf>,

    /// Execute for so many iterations and exit
    #[arg(value_name = "ITERATIONS", allow_negative_numbers = true)]
    pub iterations: Option<i64>,
}

impl Cli {
    /// Parse CLI arguments from the process environment
    ///
    /// Unlike `Parser::parse`, this does not exit: help, version and usage errors
    /// come back as a `clap::Error` so the caller controls the exit status.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Parse CLI arguments from an explicit argument list
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}

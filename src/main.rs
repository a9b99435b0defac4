//! blklat CLI entry point

use anyhow::Result;
use blklat::config::{cli::Cli, cli_convert, toml, validator, Config, OutputMode};
use blklat::worker;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, cli.debug);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the optional config file with the command line
fn load_config(cli: &Cli) -> Result<Config> {
    let file = match &cli.config {
        Some(path) => Some(toml::parse_toml_file(path)?),
        None => None,
    };

    Ok(cli_convert::build_config(cli, file.as_ref())?)
}

/// Diagnostics go to stderr; stdout carries report lines only
fn init_logging(config: &Config, debug: bool) {
    let default_level = if debug {
        "debug"
    } else {
        match config.output {
            OutputMode::Verbose => "info",
            OutputMode::Simple => "warn",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<()> {
    validator::validate_config(config)?;

    tracing::debug!(
        device = %config.device.display(),
        op = %config.op_type,
        block_size = config.block_size,
        iterations = ?config.iterations,
        "starting"
    );

    worker::run(config)?;
    Ok(())
}

//! `verdant`: command-line front end for the climate impact toolkit.
//!
//! # Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load configuration (`--config`, `VERDANT_CONFIG`, or
//!    `verdant-config.yaml` in the working directory)
//! 3. Initialize structured logging on stderr
//! 4. Build the toolkit and run the command
//! 5. Print the result as pretty JSON on stdout

mod cli;
mod commands;
mod error;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use verdant_core::{ClimateToolkit, LogFormat, LoggingConfig, VerdantConfig};

use crate::cli::Cli;
use crate::error::CliError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);
    info!(
        config = cli.config.as_ref().map(|p| p.display().to_string()),
        "verdant starting"
    );

    let toolkit = ClimateToolkit::from_config(&config)?;
    let output = commands::run(&toolkit, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Load the configuration file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<VerdantConfig, CliError> {
    Ok(VerdantConfig::load(path)?)
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_a_config_error() {
        let result = load_config(Some(Path::new("/nonexistent/verdant-config.yaml")));
        assert!(matches!(result, Err(CliError::Config { .. })));
    }

    #[test]
    fn project_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("verdant-config.yaml");
        assert!(load_config(Some(&path)).is_ok());
    }
}

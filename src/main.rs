//! vidrelay: download videos from social and shop links and upload them to
//! Google Drive.
//!
//! Main entry point for the vidrelay CLI and server.

mod cli;
mod server;

use clap::Parser;
use tracing::{error, warn};

use vidrelay_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::server::{init_tracing, run_server, run_sync};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;

    // Initialize tracing with file and console output
    init_tracing(&config.logging)?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("Config {}: {}", err.path, err.message);
        }
        return Err(format!("Invalid configuration in {}", cli.config.display()).into());
    }

    match cli.command {
        None => run_server(config).await,
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        Some(Commands::Sync { limit }) => run_sync(config, limit).await,
    }
}

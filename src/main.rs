//! playrec - records browser interactions and turns them into Playwright tests.
//!
//! Main entry point for the playrec CLI and server.

mod cli;
mod commands;
mod server;

use clap::Parser;
use tracing::warn;

use playrec_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    server::init_tracing(&config.storage.logs_path())?;
    check_config(&config)?;

    match cli.command {
        None => server::run_server(config).await,
        Some(Commands::Serve { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_server(config).await
        }
        Some(Commands::Generate {
            steps,
            format,
            output,
        }) => commands::generate(&config, &steps, format, output).await,
        Some(Commands::History { action }) => commands::history(&config, action).await,
    }
}

/// Log warnings and refuse to start on errors.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if result.is_valid() {
        return Ok(());
    }
    let errors: Vec<String> = result
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect();
    Err(format!("Invalid configuration: {}", errors.join("; ")).into())
}

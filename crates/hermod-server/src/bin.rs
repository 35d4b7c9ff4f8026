//! Hermod CLI application
//!
//! This module provides the command-line interface for the Hermod webhook
//! delivery service: serving the API and workers, one-shot retention
//! sweeps, and orphan reconciliation.

use hermod_server::cli::commands;
use hermod_server::cli::{parse_cli, Commands};
use hermod_utils::config::Settings;

/// Main function to run the Hermod application
///
/// This function initializes the application, parses command-line arguments,
/// and executes the appropriate command based on user input.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_cli();

    // Load configuration
    let config = Settings::new(cli.config.clone()).expect("Failed to load configuration");

    // Initialize logger
    hermod_utils::logging::init(&config.log.level).expect("Failed to initialize logger");

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => commands::serve(&config).await?,
        Commands::Cleanup => commands::cleanup(&config)?,
        Commands::RequeueOrphans { older_than_minutes } => {
            commands::requeue_orphans(&config, older_than_minutes)?
        }
    }
    Ok(())
}

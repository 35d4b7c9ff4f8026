pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
/// Hermod CLI
///
/// This CLI provides commands to run the Hermod webhook delivery service
/// and to perform operator maintenance.
pub struct Cli {
    /// Optional path to a configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server, delivery workers, and cleanup scheduler
    Serve,

    /// Run one retention sweep and exit
    Cleanup,

    /// Re-enqueue webhooks that never received a delivery attempt
    RequeueOrphans {
        /// Only consider webhooks older than this many minutes
        #[arg(long, default_value_t = 60)]
        older_than_minutes: i64,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

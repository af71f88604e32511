mod discover;
mod list;
mod progress;

pub use discover::DiscoverCommand;
pub use list::ListCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// scout - find the RPC nodes of a gossip cluster that are alive right now
#[derive(Parser)]
#[command(name = "scout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Discover cluster members and check which ones answer RPC.
    Discover(DiscoverCommand),

    /// Show the active nodes saved by the last discovery run.
    List(ListCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Discover(cmd) => cmd.execute().await,
            Commands::List(cmd) => cmd.execute().await,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()))
        .with_writer(std::io::stderr)
        .try_init();
}

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::info;

use scout_core::ScoutConfig;
use scout_runtime::{DiscoveryOrchestrator, DiscoveryReport, HttpTransport};

use super::progress::ProgressObserver;

/// Run one discovery pass.
#[derive(Parser)]
pub struct DiscoverCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "scout.toml")]
    pub config: String,

    /// Seed RPC URL (repeatable, replaces the configured bootstrap list).
    #[arg(short, long = "seed", value_name = "URL")]
    pub seeds: Vec<String>,

    /// Only probe nodes that advertise an RPC endpoint.
    #[arg(long)]
    pub no_null_rpc: bool,

    /// Maximum expansion rounds (0 disables expansion).
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl DiscoverCommand {
    /// Execute the discover command.
    pub async fn execute(self) -> Result<()> {
        super::init_tracing(self.verbose);

        println!();
        println!(
            "  {}  {} v{}",
            style("🔭").bold(),
            style("scout").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!();

        let config = self.load_config()?;
        println!(
            "  {} {} bootstrap endpoint(s)",
            style("→").dim(),
            config.discovery.bootstrap.len()
        );
        println!();

        let transport = Arc::new(HttpTransport::new()?);
        let orchestrator = DiscoveryOrchestrator::new(config, transport)
            .with_observer(Arc::new(ProgressObserver::new()));

        let report = orchestrator.run().await?;
        print_summary(&report, &orchestrator);

        Ok(())
    }

    /// Load the config file (defaults if it doesn't exist) and apply flags.
    pub fn load_config(&self) -> Result<ScoutConfig> {
        let path = std::path::Path::new(&self.config);
        if path.exists() {
            info!("Loading configuration from {}", self.config);
        }
        let mut config = ScoutConfig::from_file_or_default(path)?;

        if !self.seeds.is_empty() {
            config.discovery.bootstrap = self.seeds.clone();
        }
        if self.no_null_rpc {
            config.discovery.scan_null_rpc = false;
        }
        if let Some(rounds) = self.rounds {
            config.discovery.max_expansion_rounds = rounds;
        }

        if config.discovery.bootstrap.is_empty() {
            anyhow::bail!(
                "No bootstrap endpoints configured.\nPass --seed <URL> or set discovery.bootstrap in {}.",
                self.config
            );
        }

        Ok(config)
    }
}

fn print_summary(report: &DiscoveryReport, orchestrator: &DiscoveryOrchestrator) {
    let store = orchestrator.store();

    println!();
    println!("  {} Seeds queried:     {}", style("→").dim(), report.seeds);
    println!("  {} Nodes discovered:  {}", style("→").dim(), report.discovered);
    println!("  {} Nodes probed:      {}", style("→").dim(), report.probed);
    for round in &report.rounds {
        println!(
            "  {} Expansion round {}: {} new, {} active",
            style("→").dim(),
            round.round,
            round.new_nodes,
            round.activated
        );
    }
    println!();
    println!(
        "  {} {} active nodes saved to {}",
        style("✓").green(),
        style(report.active).bold(),
        style(store.active_nodes_path().display()).cyan()
    );
    println!(
        "  {} Full cluster saved to {}",
        style("✓").green(),
        style(store.full_cluster_path().display()).cyan()
    );
    println!(
        "  {} Finished in {:.1}s",
        style("ℹ").blue(),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
    println!();
}

//! autocourier CLI.
//!
//! `autocourier` runs the courier daemon against the saved configuration;
//! `autocourier configure` runs the interactive setup wizard;
//! `autocourier show` prints the configuration summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use autocourier::config;
use autocourier::scheduler::Scheduler;
use autocourier::sender::HttpSender;

#[derive(Parser)]
#[command(
    name = "autocourier",
    version,
    about = "Multi-account automated message courier"
)]
struct Cli {
    /// Path to the config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "AUTOCOURIER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively configure accounts and channels
    Configure,
    /// Print the current configuration summary
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = autocourier::init_logging();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match cli.command {
        Some(Command::Configure) => configure(&config_path),
        Some(Command::Show) => {
            let config = config::load(&config_path)?;
            config::print_summary(&config);
            Ok(())
        }
        None => run(&config_path).await,
    }
}

fn configure(config_path: &Path) -> anyhow::Result<()> {
    let config = config::run_wizard()?;
    config::save(&config, config_path)?;
    config::print_summary(&config);
    info!(
        "Configuration completed! {} accounts configured.",
        config.accounts.len()
    );
    Ok(())
}

async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = config::load(config_path).with_context(|| {
        format!(
            "cannot start without a valid configuration at {}",
            config_path.display()
        )
    })?;
    config::print_summary(&config);

    let sender = Arc::new(
        HttpSender::new(config.api_base.clone()).context("failed to build the HTTP client")?,
    );
    let scheduler = Scheduler::new(sender);

    // Bridge ctrl-c into the scheduler's shutdown handle; workers are
    // daemon-like and die with the process.
    let handle = scheduler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown();
        }
    });

    scheduler.run(config.accounts).await?;
    Ok(())
}

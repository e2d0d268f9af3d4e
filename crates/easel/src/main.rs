use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use easel_config::EaselConfig;
use easel_store::{RedbStore, StoreContext};

mod commands;

/// Manage the presets and saved projects of the easel creative tools.
#[derive(Parser, Debug)]
#[command(name = "easel", version, about)]
struct Cli {
    /// Config file to use instead of `easel.json` next to the executable.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the store database. Overrides the config file.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(EaselConfig::config_path);
    let config = EaselConfig::load_or_create(&config_path);
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir());
    tracing::debug!("Using data directory {}", data_dir.display());

    let store = RedbStore::open(&data_dir)
        .with_context(|| format!("failed to open store in {}", data_dir.display()))?;
    let ctx = StoreContext::new(store);

    let mut out = std::io::stdout().lock();
    commands::run(&ctx, &config, cli.command, &mut out)
}

//! The `fundlens` binary.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch(args) => commands::fetch::run(&args).await,
        Commands::Universe(args) => commands::universe::run(&args).await,
        Commands::Train(args) => commands::train::run(&args),
    }
}

//! Candy Mint CLI
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod backend;
mod config;
mod sub_commands;

use crate::config::{Backend, Settings};

/// Command line client for a Candy Machine v2 drop
#[derive(Parser)]
#[command(name = "candy-mint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the configured backend
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,
    /// Logging level
    #[arg(short, long, default_value = "error")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the drop and the wallet's eligibility
    Status,
    /// Follow the background refresh
    Watch(sub_commands::watch::WatchSubCommand),
    /// Mint one item (fake backend only)
    Mint,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let reqwest_filter = "reqwest=warn,hyper=warn";

    let env_filter = EnvFilter::new(format!("{},{}", default_filter, reqwest_filter));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut settings = Settings::new(args.config)?;
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    tracing::debug!("Settings: {:?}", settings);

    let session = backend::start_session(&settings).await?;

    match &args.command {
        Commands::Status => sub_commands::status::status(&session).await,
        Commands::Watch(sub_command_args) => {
            sub_commands::watch::watch(&session, sub_command_args).await
        }
        Commands::Mint => sub_commands::mint::mint(&session, &settings).await,
    }
}

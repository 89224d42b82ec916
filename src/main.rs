//! Quire - deferred bulk writes for a fiction publishing backend
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use quire::cli::{Cli, Commands};
use quire::config::{Config, ConfigFile};
use quire::error::QuireResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> QuireResult<()> {
    let cli = Cli::parse();

    let file = ConfigFile::locate(cli.config.clone());

    // Logging format lives in the config, so it is loaded first
    let loaded = file.load().await?;
    init_logging(cli.verbose, &loaded.config);
    debug!("Using config from {}", loaded.origin);
    let config = &loaded.config;

    match cli.command {
        Commands::Run(args) => quire::cli::commands::run(args, config).await,
        Commands::Check => quire::cli::commands::check(config).await,
        Commands::Buffers(args) => quire::cli::commands::buffers(args, config).await,
        Commands::Config(args) => quire::cli::commands::config(args, &loaded, &file).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` raises the floor to info
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose.max(u8::from(config.general.verbose)) {
        0 => "quire=warn",
        1 => "quire=info",
        _ => "quire=debug",
    };
    let filter = EnvFilter::new(level);

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    }
}

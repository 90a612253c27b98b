//! corekit - Arduino core and toolchain provisioner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use corekit::cli::{Cli, Commands};
use corekit::config::ConfigManager;
use corekit::error::CorekitResult;
use std::process::ExitCode;
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

async fn run() -> CorekitResult<()> {
    let cli = Cli::parse();

    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = manager.load().await?;

    // Logging: 0 = warn (progress output only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("corekit=warn"),
        1 => EnvFilter::new("corekit=info"),
        _ => EnvFilter::new("corekit=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    }

    let cache_root = ConfigManager::resolve_cache_root(cli.cache_dir.as_deref(), &config);

    match cli.command {
        Commands::Install(args) => corekit::cli::commands::install(args, &config, cache_root).await,
        Commands::Status => corekit::cli::commands::status(&config, cache_root).await,
        Commands::Path(args) => corekit::cli::commands::path(args, &config, cache_root).await,
        Commands::Compile(args) => corekit::cli::commands::compile(args, &config, cache_root).await,
        Commands::Cache(args) => corekit::cli::commands::cache(args, cache_root).await,
        Commands::Config(args) => corekit::cli::commands::config(args, &config, &manager).await,
    }
}

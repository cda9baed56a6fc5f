use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use filefly::{Store, StoreConfig};
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("filefly=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StoreConfig::default();
    if let Some(ms) = cli.backend_config.lock_timeout_ms {
        config = config.with_lock_timeout(Duration::from_millis(ms));
    }

    let storage = backend::create_backend(&cli.backend_config).await?;
    tracing::debug!(backend = %backend::backend_label(&cli.backend_config), "Opening store");
    let store = Store::open(storage, config).await?;

    let result = match &cli.command {
        Commands::Account(command) => commands::account::run(&store, command, cli.format).await,
        Commands::Pref(command) => commands::pref::run(&store, command, cli.format).await,
    };

    // Bootstrap may have written even if the command failed.
    backend::persist(&store, &cli.backend_config).await?;
    result
}

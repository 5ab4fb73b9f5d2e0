//! cachefront - manage a file-backed key/value cache from the terminal
//!
//! Runs a single cache operation (get, set, delete, clear, has, key) against
//! the configured cache directory and prints the result.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cachefront::cli::{execute, Cli, CliError};
use cachefront::CacheService;

/// Installs a stderr log subscriber, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let config = cli.cache_config()?;
    let service = CacheService::new(config);
    execute(&cli.command, &service)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

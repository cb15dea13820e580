pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use clap::Parser;
use interfaces::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; `info` otherwise. Logs go to stderr so operator output
/// on stdout stays readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run() -> ExitCode {
    init_tracing();
    interfaces::cli::run(Cli::parse()).await
}

//! Binary crate for the `surf` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive browsing and configuration
//! - Logging setup

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod browse;
mod cli;
mod configure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr so rendered output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

//! toolrank - score and rank AI tools by popularity

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = toolrank::cli::Cli::parse();

    // RUST_LOG wins over --log-level; logs go to stderr so JSON output stays clean
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    toolrank::cli::run(cli)
}

//! ## lumber-cli
//! **Inspect and exercise a lumber logging configuration**
//!
//! - `check`: build every configured logger
//! - `show`: print a merged formatter/handler/logger entry
//! - `emit`: send one message through a named logger

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run_command(cli, &mut std::io::stdout().lock())
}

//! Meow CLI - dependency lock file manager
//!
//! Entry point for the meow command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meow::cli::output::display_error;
use meow::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v; logs go to stderr
    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run().await {
        display_error(&e);
        std::process::exit(1);
    }
}

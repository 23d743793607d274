//! Command-line entry point for the translation dictionary enricher

use clap::Parser;
use gloss_enricher::{execute, init_tracing, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let status = execute(&cli, |key| std::env::var(key).ok()).await;
    status.into()
}

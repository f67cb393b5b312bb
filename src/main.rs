mod cli;
mod engine;
mod error;
mod locations;
mod logging;
mod modal;
mod model;
mod orchestrator;
mod presentation;
mod selection;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}

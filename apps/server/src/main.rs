//! Subjekt: Czech business entity search.
//!
//! Serves the `/search` and `/geocode` HTTP API, or runs one-shot searches
//! from the command line.

mod commands;
mod geocode;
mod routes;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

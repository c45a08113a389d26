//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Rendering the screen state in the terminal

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

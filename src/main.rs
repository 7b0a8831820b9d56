//! # VCS Locator CLI
//!
//! This is the binary entry point for the `vcslocator` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command and reporting top-level errors.
//!
//! The core logic lives in the `vcslocator` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();
    cli.execute()
}

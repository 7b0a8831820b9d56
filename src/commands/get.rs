//! # Get Command Implementation
//!
//! This module implements the `get` subcommand, which fetches a single file
//! and writes it to stdout or to a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use vcslocator::{Fetcher, Options};

/// Fetch a single file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// The VCS locator of the file, including its #subpath
    #[arg(value_name = "LOCATOR")]
    pub locator: String,

    /// Write the file here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `get` command.
pub fn execute(args: GetArgs, options: &Options) -> Result<()> {
    let fetcher = Fetcher::new(options.clone());

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            fetcher.copy_file(&args.locator, &mut file)?;
            file.flush()?;
            info!("wrote {} to {}", args.locator, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            fetcher.copy_file(&args.locator, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}

//! # Download Command Implementation
//!
//! This module implements the `download` subcommand, which mirrors the
//! subpath of a locator (or the whole repository when it has none) into a
//! local directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use vcslocator::{Fetcher, Options};

/// Mirror a directory (or a whole repository) to a local path
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// The VCS locator of the directory to mirror
    #[arg(value_name = "LOCATOR")]
    pub locator: String,

    /// Destination directory
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Execute the `download` command.
pub fn execute(args: DownloadArgs, options: &Options) -> Result<()> {
    let fetcher = Fetcher::new(options.clone());
    let written = fetcher.download(&args.locator, &args.dir)?;
    println!(
        "Downloaded {} file(s) into {}",
        written.len(),
        args.dir.display()
    );
    Ok(())
}

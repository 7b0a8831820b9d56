//! # Group Command Implementation
//!
//! This module implements the `group` subcommand, which fetches several
//! files in one batch. Locators pointing at the same repository and
//! revision share a single clone.
//!
//! File `i` is written to `<output-dir>/<i>-<file name>`. When some
//! locators fail, the others are still written and the command exits with
//! an error listing the failing indices.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;

use vcslocator::{parse, Error, Fetcher, Options};

/// Fetch several files at once, cloning each repository only once
#[derive(Args, Debug)]
pub struct GroupArgs {
    /// The VCS locators to fetch
    #[arg(value_name = "LOCATOR", required = true)]
    pub locators: Vec<String>,

    /// Directory the files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,
}

/// Execute the `group` command.
pub fn execute(args: GroupArgs, options: &Options) -> Result<()> {
    let fetcher = Fetcher::new(options.clone());
    let mut buffers: Vec<Vec<u8>> = vec![Vec::new(); args.locators.len()];

    let failed = match fetcher.copy_file_group(&args.locators, &mut buffers) {
        Ok(()) => Vec::new(),
        Err(Error::Group(errors)) => {
            for (i, error) in errors.iter().enumerate() {
                if let Some(error) = error {
                    eprintln!("locator #{} ({}): {}", i, args.locators[i], error);
                }
            }
            errors.failed_indices()
        }
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    for (i, (locator, data)) in args.locators.iter().zip(&buffers).enumerate() {
        if failed.contains(&i) {
            continue;
        }
        let target = args
            .output_dir
            .join(output_file_name(i, locator, options));
        fs::write(&target, data).with_context(|| format!("writing {}", target.display()))?;
        println!("{}", target.display());
    }

    if failed.is_empty() {
        Ok(())
    } else {
        let indices: Vec<String> = failed.iter().map(|i| i.to_string()).collect();
        Err(anyhow!(
            "{} of {} locator(s) failed: {}",
            failed.len(),
            args.locators.len(),
            indices.join(", ")
        ))
    }
}

/// `<index>-<last path segment of the subpath>`
fn output_file_name(index: usize, locator: &str, options: &Options) -> String {
    let name = parse(locator, options)
        .ok()
        .and_then(|c| {
            Path::new(&c.sub_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "content".to_string());
    format!("{}-{}", index, name)
}

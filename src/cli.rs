//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vcslocator::defaults::DEFAULT_MAX_WORKERS;
use vcslocator::Options;

use crate::commands;

/// VCS Locator - Fetch files from repositories named by VCS locators
#[derive(Parser, Debug)]
#[command(name = "vcslocator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG overrides it.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Read ambiguous revisions as branch names instead of tags
    #[arg(long, global = true)]
    ref_is_branch: bool,

    /// Check repositories out under this directory instead of in memory
    #[arg(long, global = true, value_name = "DIR", env = "VCSLOCATOR_CLONE_PATH")]
    clone_path: Option<PathBuf>,

    /// Do not look up SSH agents, SSH keys or HTTP credentials
    #[arg(long, global = true)]
    no_credentials: bool,

    /// Username for HTTP basic authentication
    #[arg(long, global = true, value_name = "USER", env = "VCSLOCATOR_HTTP_USERNAME")]
    http_username: Option<String>,

    /// Password or token for HTTP basic authentication
    #[arg(
        long,
        global = true,
        value_name = "PASSWORD",
        env = "VCSLOCATOR_HTTP_PASSWORD",
        hide_env_values = true
    )]
    http_password: Option<String>,

    /// Maximum number of concurrent clones and copies in batch operations
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_MAX_WORKERS)]
    max_workers: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a locator and print its components
    Parse(commands::parse::ParseArgs),

    /// Fetch a single file
    Get(commands::get::GetArgs),

    /// Mirror a directory (or a whole repository) to a local path
    Download(commands::download::DownloadArgs),

    /// Fetch several files at once, cloning each repository only once
    Group(commands::group::GroupArgs),
}

impl Cli {
    /// Initialize env_logger with `--log-level` as the default filter
    pub fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        // A logger may already be installed when running under a test harness
        env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .try_init()
            .ok();
    }

    /// Options assembled from the global flags
    pub fn options(&self) -> Options {
        let mut options = Options::default()
            .with_ref_as_branch(self.ref_is_branch)
            .with_read_credentials(!self.no_credentials)
            .with_max_workers(self.max_workers);
        if let Some(path) = &self.clone_path {
            options = options.with_clone_path(path);
        }
        options.http_username = self.http_username.clone();
        options.http_password = self.http_password.clone();
        options
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let options = self.options();
        match self.command {
            Commands::Parse(args) => commands::parse::execute(args, &options),
            Commands::Get(args) => commands::get::execute(args, &options),
            Commands::Download(args) => commands::download::execute(args, &options),
            Commands::Group(args) => commands::group::execute(args, &options),
        }
    }
}

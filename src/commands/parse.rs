//! # Parse Command Implementation
//!
//! This module implements the `parse` subcommand, which parses a locator and
//! prints its components. Nothing is cloned.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use vcslocator::{Components, Locator, Options};

/// Parse a locator and print its components
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// The VCS locator to parse
    #[arg(value_name = "LOCATOR")]
    pub locator: String,

    /// Print the components as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    #[serde(flatten)]
    components: &'a Components,
    repo_url: Option<String>,
}

/// Execute the `parse` command.
pub fn execute(args: ParseArgs, options: &Options) -> Result<()> {
    let locator = Locator::new(args.locator);
    let components = locator
        .parse(options)
        .with_context(|| format!("invalid locator {:?}", locator.as_str()))?;

    if args.json {
        let output = ParseOutput {
            components: &components,
            repo_url: components.repo_url(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render(&components));
    }
    Ok(())
}

fn render(c: &Components) -> String {
    let rows = [
        ("tool", c.tool.as_str()),
        ("transport", c.transport.as_str()),
        ("hostname", c.hostname.as_str()),
        ("repo path", c.repo_path.as_str()),
        ("ref", c.ref_string.as_str()),
        ("commit", c.commit()),
        ("tag", c.tag()),
        ("branch", c.branch()),
        ("subpath", c.sub_path.as_str()),
    ];
    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{:<10} {}\n", format!("{}:", label), value));
    }
    let url = c.repo_url().unwrap_or_default();
    out.push_str(&format!("{:<10} {}\n", "repo url:", url));
    out
}

//! # VCS Locator Library
//!
//! This library parses VCS locators, compact URI-like strings naming a file
//! or directory inside a version-controlled repository at a given revision,
//! and fetches the content they point to. It is used by the `vcslocator`
//! command-line tool but is meant to be embedded in other applications.
//!
//! ## Quick Example
//!
//! ```
//! use vcslocator::{Locator, Options};
//!
//! let locator = Locator::new("git+https://github.com/example/test@v1.2.0#docs/README.md");
//! let components = locator.parse(&Options::default()).unwrap();
//!
//! assert_eq!(components.tool, "git");
//! assert_eq!(components.hostname, "github.com");
//! assert_eq!(components.repo_path, "/example/test");
//! assert_eq!(components.tag(), "v1.2.0");
//! assert_eq!(components.sub_path, "docs/README.md");
//! assert_eq!(
//!     components.repo_url().as_deref(),
//!     Some("https://github.com/example/test")
//! );
//! ```
//!
//! ## Locator Grammar
//!
//! ```text
//! [<tool>+]<transport>://<host>[/<repo-path>][@<ref>][#<subpath>]
//! | <owner>/<repo>[@<ref>][#<subpath>]     ; GitHub slug shorthand
//! | file://<path>[@<ref>][#<subpath>]      ; local shorthand
//! ```
//!
//! ## Core Concepts
//!
//! - **Parsing (`locator`, `refs`, `components`)**: turns a locator string
//!   into typed [`Components`]; the revision token after `@` is classified
//!   as a commit, tag or branch.
//! - **Repository access (`repository`, `git`, `auth`)**: clones the
//!   repository with the system `git`, resolving credentials on the way.
//! - **Content filesystems (`filesystem`)**: read access to a checkout,
//!   either in memory or on disk.
//! - **Fetching (`fetch`, `plan`, `executor`)**: single-file, directory and
//!   batched fetches. Batches clone each distinct repository and revision
//!   once, on a bounded worker pool.
//!
//! ## Batch Flow
//!
//! 1.  **Plan**: parse every locator and group them by repository and
//!     revision.
//! 2.  **Clone**: clone every plan in parallel. Any failure fails the batch.
//! 3.  **Copy**: stream each requested file to its writer in parallel. Per
//!     file failures are collected in a positional [`ErrorList`].

pub mod auth;
pub mod components;
pub mod defaults;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod filesystem;
pub mod git;
pub mod locator;
pub mod options;
pub mod plan;
pub mod refs;
pub mod repository;

#[cfg(test)]
mod locator_proptest;

pub use components::{Components, Transport};
pub use error::{Error, ErrorList, ParseError, Result};
pub use fetch::{
    clone_repository, copy_file, copy_file_group, download, get_file, get_group, Fetcher,
};
pub use locator::{parse, Locator};
pub use options::Options;
pub use refs::Revision;

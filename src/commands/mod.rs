//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `vcslocator` command-line tool. Each subcommand lives in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments, derived
//!   using `clap`.
//! - An `execute` function that takes the parsed `Args` and the global
//!   [`Options`](vcslocator::Options) and calls into the `vcslocator`
//!   library.

pub mod download;
pub mod get;
pub mod group;
pub mod parse;

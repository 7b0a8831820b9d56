//! Default values for vcslocator.
//!
//! This module provides centralized default values used across the library
//! and the CLI, ensuring consistency and avoiding duplication.

/// Ceiling for concurrent clone and copy tasks in batch operations.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Tool implied by the `owner/repo` and `file://` shorthands.
pub const DEFAULT_TOOL: &str = "git";

/// Host implied by the `owner/repo` shorthand.
pub const SLUG_HOSTNAME: &str = "github.com";

/// SSH user for SCP-style repository URLs.
pub const SSH_USER: &str = "git";

/// Private key file names tried, in order, when no SSH agent is running.
pub const SSH_KEY_FILES: [&str; 4] = ["id_ed25519", "id_ecdsa", "id_rsa", "id_dsa"];

//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures and helper functions to reduce duplication
//! across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let repo = LocalRepo::new().with_file("README.md", "hello");
//!     repo.commit("initial");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    #[allow(unused_imports)]
    pub use super::LocalRepo;
}

/// Check if network tests should be skipped.
///
/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A throwaway git repository built with the system `git`.
///
/// The default branch is `main`. Fetching unadvertised commits is allowed so
/// commits that only live on side branches can be requested by hash.
///
/// # Example
///
/// ```rust,ignore
/// let repo = LocalRepo::new().with_file("README.md", "v1");
/// repo.commit("first");
/// repo.tag("v1");
/// let locator = repo.locator("@v1#README.md");
/// ```
#[allow(dead_code)]
pub struct LocalRepo {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl LocalRepo {
    /// Create an empty repository.
    pub fn new() -> Self {
        let repo = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "uploadpack.allowAnySHA1InWant", "true"]);
        repo
    }

    /// Write a file into the worktree (not committed).
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// Write a file into the worktree (not committed).
    pub fn write(&self, path: &str, content: &str) {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Commit everything and return the new commit hash.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    /// Switch to `name`, creating the branch when it does not exist.
    pub fn switch(&self, name: &str) {
        let exists = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", name)])
            .status()
            .expect("Failed to run git")
            .success();
        if exists {
            self.git(&["checkout", "--quiet", name]);
        } else {
            self.git(&["checkout", "--quiet", "-b", name]);
        }
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `file://` locator for this repository followed by `suffix`
    /// (`@ref`, `#subpath` or both).
    pub fn locator(&self, suffix: &str) -> String {
        format!("file://{}{}", self.path().display(), suffix)
    }

    /// Run git in the repository and return its trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

impl Default for LocalRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_local_repo_commits_and_tags() {
        let repo = LocalRepo::new().with_file("README.md", "hello");
        let commit = repo.commit("initial");
        repo.tag("v1");
        assert_eq!(commit.len(), 40);
        assert_eq!(repo.git(&["rev-parse", "v1"]), commit);
        assert!(repo.locator("#README.md").starts_with("file:///"));
    }
}

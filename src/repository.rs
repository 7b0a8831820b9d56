//! # Repository Access
//!
//! This module provides the `RepositoryManager`, which turns parsed locator
//! components into a readable [`ContentFs`]. It hides the `git` plumbing
//! (clone, fetch, revision resolution, checkout) and the choice between an
//! in-memory and an on-disk checkout.
//!
//! ## Design
//!
//! The manager is built around two traits so the moving parts can be
//! swapped out, which is particularly useful for testing:
//!
//! - **`GitOperations`**: the four git primitives the manager needs. The
//!   default implementation shells out to the system `git` binary.
//!
//! - **`AuthResolver`** (see [`crate::auth`]): picks the credentials handed
//!   to git.
//!
//! ## Clone strategy
//!
//! 1.  Clone only the requested branch or tag (or the default branch). The
//!     clone is shallow unless a specific commit was requested.
//! 2.  For a commit, resolve it in the clone. If it is not there, fetch it
//!     explicitly from `origin` and resolve again, then check it out.
//! 3.  A fully qualified ref that is neither a tag nor a branch (for
//!     example `refs/notes/commits`) is fetched explicitly and its
//!     `FETCH_HEAD` checked out.
//! 4.  Without a clone path the worktree is loaded into a `MemoryFS` and the
//!     temporary checkout is deleted; with one, a `DiskFS` over the checkout
//!     is returned. The clone path must be missing or empty.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::auth::{AuthResolver, Credential, DefaultAuthResolver};
use crate::components::Components;
use crate::defaults::DEFAULT_TOOL;
use crate::error::{Error, Result};
use crate::filesystem::{ContentFs, DiskFS};
use crate::options::Options;

/// Parameters for a single clone.
#[derive(Debug, Clone, Copy)]
pub struct CloneRequest<'a> {
    pub url: &'a str,
    /// Branch or tag to clone. `None` clones the default branch.
    pub reference: Option<&'a str>,
    pub auth: Option<&'a Credential>,
    pub single_branch: bool,
    pub shallow: bool,
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones a repository into `target_dir`.
    fn clone_repo(&self, request: &CloneRequest<'_>, target_dir: &Path) -> Result<()>;

    /// Fetches `refspec` from `origin` into an existing clone.
    fn fetch(
        &self,
        repo_dir: &Path,
        url: &str,
        refspec: &str,
        auth: Option<&Credential>,
    ) -> Result<()>;

    /// Resolves a revision to a full commit hash.
    fn resolve_revision(&self, repo_dir: &Path, revision: &str) -> Result<String>;

    /// Checks out a commit.
    fn checkout(&self, repo_dir: &Path, commit: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, request: &CloneRequest<'_>, target_dir: &Path) -> Result<()> {
        crate::git::clone(request, target_dir)
    }

    fn fetch(
        &self,
        repo_dir: &Path,
        url: &str,
        refspec: &str,
        auth: Option<&Credential>,
    ) -> Result<()> {
        crate::git::fetch(repo_dir, url, refspec, auth)
    }

    fn resolve_revision(&self, repo_dir: &Path, revision: &str) -> Result<String> {
        crate::git::resolve_revision(repo_dir, revision)
    }

    fn checkout(&self, repo_dir: &Path, commit: &str) -> Result<()> {
        crate::git::checkout(repo_dir, commit)
    }
}

/// Turns locator components into content filesystems.
pub struct RepositoryManager {
    git_ops: Box<dyn GitOperations>,
    auth: Box<dyn AuthResolver>,
}

impl Default for RepositoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryManager {
    /// Creates a manager backed by the system `git` and the default
    /// credential resolver.
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
            auth: Box::new(DefaultAuthResolver::new()),
        }
    }

    /// Creates a manager with custom `GitOperations` and `AuthResolver`
    /// implementations.
    pub fn with_operations(git_ops: Box<dyn GitOperations>, auth: Box<dyn AuthResolver>) -> Self {
        Self { git_ops, auth }
    }

    /// Returns the credential that would be used for `components`, or
    /// `None` when credential lookup is disabled or finds nothing.
    pub fn resolve_auth(
        &self,
        components: &Components,
        options: &Options,
    ) -> Result<Option<Credential>> {
        if !options.read_credentials {
            return Ok(None);
        }
        self.auth.resolve(components, options)
    }

    /// Clones the repository described by `components`, checking it out
    /// under `options.clone_path` when set and in memory otherwise.
    pub fn clone_repository(
        &self,
        components: &Components,
        options: &Options,
    ) -> Result<Arc<dyn ContentFs>> {
        self.clone_into(components, options, options.clone_path.as_deref())
    }

    /// Clones the repository into `target`, or into memory when `target` is
    /// `None`.
    pub fn clone_into(
        &self,
        components: &Components,
        options: &Options,
        target: Option<&Path>,
    ) -> Result<Arc<dyn ContentFs>> {
        if components.tool != DEFAULT_TOOL {
            return Err(Error::UnsupportedTool {
                tool: components.tool.clone(),
            });
        }

        let url = components.repo_url().ok_or_else(|| Error::NoRepositoryUrl {
            transport: components.transport.to_string(),
        })?;
        let auth = self.resolve_auth(components, options)?;

        let commit = components.commit();
        let explicit_ref = components.revision.is_none() && !components.ref_string.is_empty();
        let request = CloneRequest {
            url: &url,
            reference: components.clone_reference(),
            auth: auth.as_ref(),
            single_branch: true,
            shallow: commit.is_empty(),
        };

        // Keep the temporary directory alive until the worktree is loaded
        let (checkout_dir, _temp_guard) = match target {
            Some(path) => {
                ensure_empty_target(path)?;
                (path.to_path_buf(), None)
            }
            None => {
                let temp = tempfile::Builder::new().prefix("vcslocator-").tempdir()?;
                (temp.path().join("worktree"), Some(temp))
            }
        };

        self.git_ops.clone_repo(&request, &checkout_dir)?;

        if !commit.is_empty() {
            self.checkout_commit(&checkout_dir, &url, commit, auth.as_ref())?;
        } else if explicit_ref {
            self.checkout_ref(&checkout_dir, &url, &components.ref_string, auth.as_ref())?;
        }

        match target {
            Some(_) => {
                debug!("checked out {} at {}", url, checkout_dir.display());
                Ok(Arc::new(DiskFS::new(checkout_dir)))
            }
            None => {
                let fs = crate::git::load_worktree(&checkout_dir)?;
                debug!("loaded {} files from {} into memory", fs.len(), url);
                Ok(Arc::new(fs))
            }
        }
    }

    fn checkout_commit(
        &self,
        dir: &Path,
        url: &str,
        commit: &str,
        auth: Option<&Credential>,
    ) -> Result<()> {
        let resolved = match self.git_ops.resolve_revision(dir, commit) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(
                    "commit {} not reachable from the cloned branch of {} ({}), fetching it",
                    commit, url, e
                );
                self.git_ops.fetch(dir, url, commit, auth)?;
                self.git_ops.resolve_revision(dir, commit)?
            }
        };
        self.git_ops.checkout(dir, &resolved)
    }

    fn checkout_ref(
        &self,
        dir: &Path,
        url: &str,
        reference: &str,
        auth: Option<&Credential>,
    ) -> Result<()> {
        self.git_ops.fetch(dir, url, reference, auth)?;
        let resolved = self.git_ops.resolve_revision(dir, "FETCH_HEAD")?;
        self.git_ops.checkout(dir, &resolved)
    }
}

/// Fails unless `path` is missing or an empty directory. Caller-supplied
/// checkout directories are never cleared.
fn ensure_empty_target(path: &Path) -> Result<()> {
    match std::fs::read_dir(path) {
        Ok(mut entries) => match entries.next() {
            None => Ok(()),
            Some(_) => Err(Error::CloneTargetNotEmpty {
                path: path.display().to_string(),
            }),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Per-plan checkout directory below a batch clone path.
pub(crate) fn batch_checkout_dir(root: &Path, components: &Components) -> PathBuf {
    let url = components.repo_url().unwrap_or_default();
    root.join(crate::git::clone_dir_name(&url, &components.ref_string))
}

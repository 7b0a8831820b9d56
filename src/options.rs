//! Configuration shared by parsing and fetching.

use std::path::PathBuf;

use crate::defaults::DEFAULT_MAX_WORKERS;

/// Options tune how locators are interpreted and how repositories are
/// fetched.
///
/// ```
/// use vcslocator::Options;
///
/// let opts = Options::default()
///     .with_ref_as_branch(true)
///     .with_http_auth("bot", "s3cret");
/// assert!(opts.ref_is_branch);
/// assert!(opts.read_credentials);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Read ambiguous revision tokens as branch names instead of tags.
    pub ref_is_branch: bool,
    /// Check repositories out on disk at this path. `None` keeps the
    /// checkout in memory.
    pub clone_path: Option<PathBuf>,
    /// Consult the credential resolver before cloning.
    pub read_credentials: bool,
    pub http_username: Option<String>,
    pub http_password: Option<String>,
    /// Ceiling for concurrent clone and copy tasks in batch operations.
    pub max_workers: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ref_is_branch: false,
            clone_path: None,
            read_credentials: true,
            http_username: None,
            http_password: None,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl Options {
    pub fn with_ref_as_branch(mut self, yes: bool) -> Self {
        self.ref_is_branch = yes;
        self
    }

    pub fn with_clone_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.clone_path = Some(path.into());
        self
    }

    pub fn with_read_credentials(mut self, yes: bool) -> Self {
        self.read_credentials = yes;
        self
    }

    /// Sets basic-auth credentials used for https transports.
    pub fn with_http_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.http_username = Some(username.into());
        self.http_password = Some(password.into());
        self
    }

    /// Sets the worker ceiling. Zero is treated as one.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// Worker ceiling, never below one.
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    pub(crate) fn has_http_credentials(&self) -> bool {
        self.http_username.as_deref().is_some_and(|u| !u.is_empty())
            || self.http_password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

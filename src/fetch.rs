//! # Fetching
//!
//! The outward API: read files and directories out of repositories named by
//! VCS locators.
//!
//! [`Fetcher`] bundles a [`RepositoryManager`] with the [`Options`] to use.
//! The free functions at the bottom of this module build a default
//! `Fetcher` for one-off calls.
//!
//! ## Batches
//!
//! [`Fetcher::copy_file_group`] takes N locators and N writers. Locators
//! that share a repository and revision are cloned once. Clone failures
//! fail the whole call; per-file failures are reported positionally in an
//! [`ErrorList`] so callers can keep whatever succeeded.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::auth::Credential;
use crate::components::Components;
use crate::error::{Error, ErrorList, Result};
use crate::executor::{copy_path, BoundedExecutor};
use crate::filesystem::{normalize_path, ContentFs};
use crate::locator::parse;
use crate::options::Options;
use crate::plan::{build_plans, FetchPlan};
use crate::repository::{batch_checkout_dir, RepositoryManager};

/// Fetches content from repositories named by VCS locators.
pub struct Fetcher {
    manager: RepositoryManager,
    options: Options,
}

impl Fetcher {
    /// Creates a fetcher using the system `git` and default credential
    /// discovery.
    pub fn new(options: Options) -> Self {
        Self::with_manager(RepositoryManager::new(), options)
    }

    pub fn with_manager(manager: RepositoryManager, options: Options) -> Self {
        Self { manager, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Clones the repository of `locator` and returns its content
    /// filesystem.
    pub fn clone_repository(&self, locator: &str) -> Result<Arc<dyn ContentFs>> {
        let components = parse(locator, &self.options)?;
        self.manager.clone_repository(&components, &self.options)
    }

    /// Copies the file named by `locator` into `writer`.
    ///
    /// The locator must carry a `#subpath`.
    pub fn copy_file<W: Write + ?Sized>(&self, locator: &str, writer: &mut W) -> Result<()> {
        let components = self.parse_with_subpath(locator)?;
        let content = self.manager.clone_repository(&components, &self.options)?;
        copy_path(content.as_ref(), &components.sub_path, writer)
    }

    /// Returns the contents of the file named by `locator`.
    pub fn get_file(&self, locator: &str) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.copy_file(locator, &mut buffer)?;
        Ok(buffer)
    }

    /// Mirrors the subpath of `locator` into `dest_dir`.
    ///
    /// Every file whose path starts with the subpath (compared component by
    /// component) is written below `dest_dir` at its repository-relative
    /// path. An empty subpath mirrors the whole repository. Returns the
    /// written files in sorted order.
    pub fn download(&self, locator: &str, dest_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dest_dir = dest_dir.as_ref();
        let components = parse(locator, &self.options)?;
        let prefix = if components.sub_path.trim_matches('/').is_empty() {
            None
        } else {
            Some(normalize_path(&components.sub_path)?)
        };

        let content = self.manager.clone_repository(&components, &self.options)?;

        let mut written = Vec::new();
        for path in content.files()? {
            if let Some(prefix) = &prefix {
                if !path.starts_with(prefix) {
                    continue;
                }
            }

            let target = dest_dir.join(&path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(&target).map_err(|source| Error::Copy {
                path: target.display().to_string(),
                source,
            })?;
            copy_path(content.as_ref(), &path.to_string_lossy(), &mut file)?;
            written.push(target);
        }

        debug!(
            "mirrored {} file(s) from {} into {}",
            written.len(),
            locator,
            dest_dir.display()
        );
        Ok(written)
    }

    /// Copies the files of N locators into N writers.
    ///
    /// Writer `i` receives the file of locator `i`. When some locators fail
    /// to parse, open or copy, returns `Error::Group` whose slot `i` holds
    /// the error of locator `i`; the other writers still receive their
    /// data. A failed clone aborts the batch with `Error::CloneBatch` before
    /// anything is written.
    pub fn copy_file_group<S, W>(&self, locators: &[S], writers: &mut [W]) -> Result<()>
    where
        S: AsRef<str>,
        W: Write + Send,
    {
        if locators.len() != writers.len() {
            return Err(Error::WriterCountMismatch {
                locators: locators.len(),
                writers: writers.len(),
            });
        }

        let batch = build_plans(locators, &self.options);
        let executor = BoundedExecutor::new(self.options.workers())?;

        executor.clone_phase(&batch.plans, |plan| self.clone_plan(plan))?;
        let copied = executor.copy_phase(&batch.plans, writers);

        let outcomes: Vec<Option<Error>> = batch
            .parse_failures
            .into_iter()
            .zip(copied)
            .map(|(parsed, copied)| parsed.or(copied))
            .collect();
        let failed = outcomes.iter().filter(|o| o.is_some()).count();
        info!(
            "fetched {} of {} locator(s) from {} repository clone(s)",
            outcomes.len() - failed,
            outcomes.len(),
            batch.plans.len()
        );

        match ErrorList::from_outcomes(outcomes) {
            None => Ok(()),
            Some(errors) => Err(Error::Group(errors)),
        }
    }

    /// Returns the contents of the files of N locators, in order.
    pub fn get_group<S: AsRef<str>>(&self, locators: &[S]) -> Result<Vec<Vec<u8>>> {
        let mut buffers: Vec<Vec<u8>> = vec![Vec::new(); locators.len()];
        self.copy_file_group(locators, &mut buffers)?;
        Ok(buffers)
    }

    /// The credential that would be used to fetch `locator`, if any.
    pub fn auth_method(&self, locator: &str) -> Result<Option<Credential>> {
        let components = parse(locator, &self.options)?;
        self.manager.resolve_auth(&components, &self.options)
    }

    fn parse_with_subpath(&self, locator: &str) -> Result<Components> {
        let components = parse(locator, &self.options)?;
        if components.sub_path.is_empty() {
            return Err(Error::NoSubPath {
                locator: locator.to_string(),
            });
        }
        Ok(components)
    }

    fn clone_plan(&self, plan: &FetchPlan) -> Result<Arc<dyn ContentFs>> {
        debug!("cloning {} for {} file(s)", plan.key, plan.files.len());
        let target = self
            .options
            .clone_path
            .as_deref()
            .map(|root| batch_checkout_dir(root, &plan.components));
        self.manager
            .clone_into(&plan.components, &self.options, target.as_deref())
    }
}

/// Clones the repository of `locator`.
pub fn clone_repository(locator: &str, options: &Options) -> Result<Arc<dyn ContentFs>> {
    Fetcher::new(options.clone()).clone_repository(locator)
}

/// Copies the file named by `locator` into `writer`.
pub fn copy_file<W: Write + ?Sized>(
    locator: &str,
    writer: &mut W,
    options: &Options,
) -> Result<()> {
    Fetcher::new(options.clone()).copy_file(locator, writer)
}

/// Returns the contents of the file named by `locator`.
pub fn get_file(locator: &str, options: &Options) -> Result<Vec<u8>> {
    Fetcher::new(options.clone()).get_file(locator)
}

/// Mirrors the subpath of `locator` into `dest_dir`.
pub fn download(
    locator: &str,
    dest_dir: impl AsRef<Path>,
    options: &Options,
) -> Result<Vec<PathBuf>> {
    Fetcher::new(options.clone()).download(locator, dest_dir)
}

/// Copies the files of N locators into N writers.
pub fn copy_file_group<S, W>(locators: &[S], writers: &mut [W], options: &Options) -> Result<()>
where
    S: AsRef<str>,
    W: Write + Send,
{
    Fetcher::new(options.clone()).copy_file_group(locators, writers)
}

/// Returns the contents of the files of N locators.
pub fn get_group<S: AsRef<str>>(locators: &[S], options: &Options) -> Result<Vec<Vec<u8>>> {
    Fetcher::new(options.clone()).get_group(locators)
}

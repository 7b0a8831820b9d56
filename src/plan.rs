//! # Fetch Plans
//!
//! A batch of locators is folded into a list of [`FetchPlan`]s, one per
//! distinct repository and revision. Each plan is cloned once and then
//! serves every batch index that points into it.
//!
//! Plans live in a `Vec` arena and are addressed by their position, which
//! is also the order in which their key was first seen. The only field
//! written after construction is the resolved filesystem handle, which the
//! clone phase attaches under a mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::components::Components;
use crate::error::{Error, Result};
use crate::filesystem::ContentFs;
use crate::locator::parse;
use crate::options::Options;

/// Key grouping locators that can share one clone.
///
/// The key is `repo_url:ref_string` rather than one built from the
/// classified branch and tag, so a commit-only locator or an unclassified
/// `refs/...` ref still gets a key of its own.
///
/// The raw revision token is part of the key, so equivalent revisions
/// spelled differently (`v1` vs `refs/tags/v1`, or two abbreviations of
/// the same commit) still produce separate clones.
pub fn dedup_key(components: &Components) -> String {
    format!(
        "{}:{}",
        components.repo_url().unwrap_or_default(),
        components.ref_string
    )
}

/// One repository clone and the batch entries it serves.
#[derive(Debug)]
pub struct FetchPlan {
    pub key: String,
    /// The first locator seen for this key.
    pub locator: String,
    pub components: Components,
    /// `(batch index, subpath)` pairs in batch order.
    pub files: Vec<(usize, String)>,
    filesystem: Mutex<Option<Arc<dyn ContentFs>>>,
}

impl FetchPlan {
    fn new(key: String, locator: String, components: Components) -> Self {
        Self {
            key,
            locator,
            components,
            files: Vec::new(),
            filesystem: Mutex::new(None),
        }
    }

    /// Stores the filesystem produced by the clone phase.
    pub fn attach(&self, fs: Arc<dyn ContentFs>) -> Result<()> {
        let mut slot = self.filesystem.lock().map_err(|_| Error::LockPoisoned {
            context: format!("attaching filesystem to plan {}", self.key),
        })?;
        *slot = Some(fs);
        Ok(())
    }

    /// The filesystem attached by the clone phase, if any.
    pub fn filesystem(&self) -> Result<Option<Arc<dyn ContentFs>>> {
        let slot = self.filesystem.lock().map_err(|_| Error::LockPoisoned {
            context: format!("reading filesystem of plan {}", self.key),
        })?;
        Ok(slot.clone())
    }
}

/// Result of planning a batch.
#[derive(Debug)]
pub struct BatchPlan {
    pub plans: Vec<FetchPlan>,
    /// One slot per batch index; `Some` when that locator failed to parse.
    pub parse_failures: Vec<Option<Error>>,
}

impl BatchPlan {
    /// Number of locators in the batch.
    pub fn len(&self) -> usize {
        self.parse_failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parse_failures.is_empty()
    }

    /// Number of batch entries that made it into a plan.
    pub fn planned_files(&self) -> usize {
        self.plans.iter().map(|p| p.files.len()).sum()
    }
}

/// Parses every locator and groups them into fetch plans.
///
/// A locator that fails to parse is recorded against its index and left
/// out of the plans; the rest of the batch is unaffected.
pub fn build_plans<S: AsRef<str>>(locators: &[S], options: &Options) -> BatchPlan {
    let mut plans: Vec<FetchPlan> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut parse_failures = Vec::with_capacity(locators.len());

    for (i, locator) in locators.iter().enumerate() {
        let locator = locator.as_ref();
        let components = match parse(locator, options) {
            Ok(c) => c,
            Err(e) => {
                debug!("locator #{} ({:?}) failed to parse: {}", i, locator, e);
                parse_failures.push(Some(Error::Parse(e)));
                continue;
            }
        };
        parse_failures.push(None);

        let key = dedup_key(&components);
        let sub_path = components.sub_path.clone();
        let slot = match by_key.get(&key) {
            Some(&slot) => slot,
            None => {
                by_key.insert(key.clone(), plans.len());
                plans.push(FetchPlan::new(key, locator.to_string(), components));
                plans.len() - 1
            }
        };
        plans[slot].files.push((i, sub_path));
    }

    debug!(
        "planned {} clone(s) for {} locator(s)",
        plans.len(),
        locators.len()
    );

    BatchPlan {
        plans,
        parse_failures,
    }
}

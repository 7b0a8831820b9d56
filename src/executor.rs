//! # Bounded Executor
//!
//! Runs the two phases of a batch fetch on a fixed-size rayon pool:
//!
//! 1.  **Clone phase**: one task per [`FetchPlan`]. Every task runs to
//!     completion even when siblings fail; any failure fails the batch and
//!     the copy phase is skipped.
//! 2.  **Copy phase**: one task per batch index. Failures are recorded in
//!     that index's slot and never stop other tasks.
//!
//! The pool is sized by [`Options::workers`](crate::Options::workers), so
//! neither phase ever runs more tasks at once than the configured ceiling.
//! The pool's `install` call returns only once every task has finished,
//! which is the barrier between the two phases.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::filesystem::ContentFs;
use crate::plan::FetchPlan;

pub struct BoundedExecutor {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl BoundedExecutor {
    /// Creates an executor running at most `max_workers` tasks at once.
    pub fn new(max_workers: usize) -> Result<Self> {
        let workers = max_workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vcslocator-worker-{}", i))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `f` over every task on the pool and returns the results in
    /// task order.
    pub fn run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        self.pool
            .install(|| tasks.into_par_iter().map(&f).collect::<Vec<R>>())
    }

    /// Clones every plan and attaches the resulting filesystem to it.
    ///
    /// Returns `Error::CloneBatch` with the failures in plan order when at
    /// least one clone failed.
    pub fn clone_phase<F>(&self, plans: &[FetchPlan], clone_plan: F) -> Result<()>
    where
        F: Fn(&FetchPlan) -> Result<Arc<dyn ContentFs>> + Send + Sync,
    {
        debug!(
            "clone phase: {} plan(s) on {} worker(s)",
            plans.len(),
            self.workers
        );

        // Collect errors from all parallel clones
        let errors: Mutex<Vec<(usize, Error)>> = Mutex::new(Vec::new());

        self.pool.install(|| {
            plans.par_iter().enumerate().for_each(|(i, plan)| {
                let outcome = clone_plan(plan).and_then(|fs| plan.attach(fs));
                if let Err(e) = outcome {
                    warn!("cloning {:?} failed: {}", plan.locator, e);
                    if let Ok(mut errors) = errors.lock() {
                        errors.push((i, e));
                    }
                }
            });
        });

        let mut errors = errors.into_inner().map_err(|_| Error::LockPoisoned {
            context: "collecting clone errors".to_string(),
        })?;
        if errors.is_empty() {
            return Ok(());
        }
        errors.sort_by_key(|(i, _)| *i);
        Err(Error::CloneBatch(
            errors.into_iter().map(|(_, e)| e).collect(),
        ))
    }

    /// Streams every planned file into the writer of its batch index.
    ///
    /// Returns one slot per writer; indices no plan refers to are left
    /// `None`.
    pub fn copy_phase<W>(&self, plans: &[FetchPlan], writers: &mut [W]) -> Vec<Option<Error>>
    where
        W: Write + Send,
    {
        let mut outcomes: Vec<Option<Error>> = (0..writers.len()).map(|_| None).collect();
        let mut sinks: Vec<Option<&mut W>> = writers.iter_mut().map(Some).collect();

        let mut tasks = Vec::new();
        for plan in plans {
            for (i, path) in &plan.files {
                if let Some(sink) = sinks.get_mut(*i).and_then(Option::take) {
                    tasks.push((*i, plan, path.as_str(), sink));
                }
            }
        }
        debug!(
            "copy phase: {} file(s) on {} worker(s)",
            tasks.len(),
            self.workers
        );

        let results = self.run(tasks, |(i, plan, path, sink)| {
            (i, copy_from_plan(plan, path, sink))
        });

        for (i, result) in results {
            if let Err(e) = result {
                debug!("copying locator #{} failed: {}", i, e);
                outcomes[i] = Some(e);
            }
        }
        outcomes
    }
}

fn copy_from_plan<W: Write>(plan: &FetchPlan, path: &str, sink: &mut W) -> Result<()> {
    let fs = plan.filesystem()?.ok_or_else(|| Error::Filesystem {
        message: format!("repository {:?} was not cloned", plan.locator),
    })?;
    copy_path(fs.as_ref(), path, sink)
}

/// Opens `path` in `fs` and streams it to `sink`.
pub fn copy_path<W: Write + ?Sized>(fs: &dyn ContentFs, path: &str, sink: &mut W) -> Result<()> {
    let mut reader = fs.open(path)?;
    io::copy(&mut reader, sink).map_err(|source| Error::Copy {
        path: path.to_string(),
        source,
    })?;
    Ok(())
}

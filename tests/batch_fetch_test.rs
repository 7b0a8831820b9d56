//! Batch fetch tests against an instrumented repository provider.
//!
//! The provider below stands in for `git`: every clone writes a fixed set
//! of files, counts itself, and records how many clones run at the same
//! time. No network or `git` binary is needed.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use vcslocator::auth::{AuthResolver, Credential};
use vcslocator::repository::{CloneRequest, GitOperations, RepositoryManager};
use vcslocator::{Components, Error, Fetcher, Options};

/// Files served for every repository, keyed by path.
type Tree = HashMap<&'static str, &'static str>;

#[derive(Default)]
struct Counters {
    clones: AtomicUsize,
    running: AtomicUsize,
    peak: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

struct InstrumentedGit {
    tree: Tree,
    counters: Arc<Counters>,
    delay: Duration,
}

impl GitOperations for InstrumentedGit {
    fn clone_repo(&self, request: &CloneRequest<'_>, target_dir: &Path) -> vcslocator::Result<()> {
        let now = self.counters.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        self.counters.clones.fetch_add(1, Ordering::SeqCst);
        self.counters
            .urls
            .lock()
            .unwrap()
            .push(request.url.to_string());

        thread::sleep(self.delay);
        for (path, content) in &self.tree {
            let full = target_dir.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }

        self.counters.running.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch(
        &self,
        _repo_dir: &Path,
        _url: &str,
        _refspec: &str,
        _auth: Option<&Credential>,
    ) -> vcslocator::Result<()> {
        Ok(())
    }

    fn resolve_revision(&self, _repo_dir: &Path, revision: &str) -> vcslocator::Result<String> {
        Ok(revision.to_string())
    }

    fn checkout(&self, _repo_dir: &Path, _commit: &str) -> vcslocator::Result<()> {
        Ok(())
    }
}

struct NoCredentials;

impl AuthResolver for NoCredentials {
    fn resolve(&self, _: &Components, _: &Options) -> vcslocator::Result<Option<Credential>> {
        Ok(None)
    }
}

fn fetcher(delay: Duration, options: Options) -> (Fetcher, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let tree: Tree = [
        ("README.md", "readme"),
        (".github/dependabot.yaml", "version: 2"),
        ("src/lib.rs", "pub fn lib() {}"),
    ]
    .into_iter()
    .collect();
    let git = InstrumentedGit {
        tree,
        counters: counters.clone(),
        delay,
    };
    let manager = RepositoryManager::with_operations(Box::new(git), Box::new(NoCredentials));
    (Fetcher::with_manager(manager, options), counters)
}

#[test]
fn test_same_repository_and_ref_is_cloned_once() {
    let (fetcher, counters) = fetcher(Duration::ZERO, Options::default());

    let data = fetcher
        .get_group(&[
            "git+https://github.com/example/test@v1#README.md",
            "git+https://github.com/example/test@v1#.github/dependabot.yaml",
        ])
        .unwrap();

    assert_eq!(counters.clones.load(Ordering::SeqCst), 1);
    assert_eq!(data[0], b"readme");
    assert_eq!(data[1], b"version: 2");
}

#[test]
fn test_one_invalid_subpath_fails_only_its_slot() {
    let (fetcher, _) = fetcher(Duration::ZERO, Options::default());
    let locators = [
        "git+https://github.com/example/test#README.md",
        "git+https://github.com/example/test#does/not/exist",
        "git+https://github.com/example/test#src/lib.rs",
    ];
    let mut writers: Vec<Vec<u8>> = vec![Vec::new(); 3];

    let err = fetcher
        .copy_file_group(&locators, &mut writers)
        .unwrap_err();

    match err {
        Error::Group(errors) => {
            assert_eq!(errors.len(), 3);
            assert!(errors.get(0).is_none());
            assert!(errors.get(1).is_some());
            assert!(errors.get(2).is_none());
        }
        other => panic!("expected a positional error list, got {other}"),
    }
    assert_eq!(writers[0], b"readme");
    assert_eq!(writers[2], b"pub fn lib() {}");
}

#[test]
fn test_clone_phase_never_exceeds_worker_ceiling() {
    let (fetcher, counters) = fetcher(Duration::from_millis(30), Options::default());
    let locators: Vec<String> = (0..12)
        .map(|i| format!("git+https://github.com/example/repo{}#README.md", i))
        .collect();

    let data = fetcher.get_group(&locators).unwrap();

    assert_eq!(data.len(), 12);
    assert_eq!(counters.clones.load(Ordering::SeqCst), 12);
    let peak = counters.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak concurrency was {}", peak);
}

#[test]
fn test_worker_ceiling_is_configurable() {
    let (fetcher, counters) = fetcher(
        Duration::from_millis(20),
        Options::default().with_max_workers(1),
    );
    let locators: Vec<String> = (0..4)
        .map(|i| format!("owner/repo{}#README.md", i))
        .collect();

    fetcher.get_group(&locators).unwrap();
    assert_eq!(counters.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_revisions_are_cloned_separately() {
    let (fetcher, counters) = fetcher(Duration::ZERO, Options::default());

    fetcher
        .get_group(&[
            "owner/repo@v1#README.md",
            "owner/repo@v2#README.md",
            "owner/repo@v1#src/lib.rs",
            "git+ssh://github.com/owner/repo@v1#README.md",
        ])
        .unwrap();

    assert_eq!(counters.clones.load(Ordering::SeqCst), 3);
    let urls = counters.urls.lock().unwrap();
    assert!(urls.contains(&"git@github.com:owner/repo".to_string()));
}

#[test]
fn test_unparsable_locator_does_not_abort_batch() {
    let (fetcher, counters) = fetcher(Duration::ZERO, Options::default());
    let mut writers: Vec<Vec<u8>> = vec![Vec::new(); 2];

    let err = fetcher
        .copy_file_group(&["ftp://example.com/repo#x", "owner/repo#README.md"], &mut writers)
        .unwrap_err();

    let Error::Group(errors) = err else {
        panic!("expected a positional error list");
    };
    assert_eq!(errors.failed_indices(), vec![0]);
    assert_eq!(counters.clones.load(Ordering::SeqCst), 1);
    assert_eq!(writers[1], b"readme");
}

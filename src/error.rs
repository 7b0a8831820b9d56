//! # Error Handling
//!
//! This module defines the centralized error handling for `vcslocator`. It
//! uses the `thiserror` library to describe every anticipated failure mode
//! with enough context (locator, url, ref, path) to be actionable.
//!
//! ## Key Components
//!
//! - **`ParseError`**: Failures of the locator grammar itself. These are
//!   fatal for the locator that produced them and are never retried.
//!
//! - **`Error`**: The main enum for everything else: unsupported tools,
//!   delegate (`git`) failures, file open/copy failures and the batch
//!   aggregates.
//!
//! - **`ErrorList`**: The positional aggregate returned by batch
//!   operations. Slot `i` holds the error for the `i`-th locator of the
//!   batch, or `None` when that locator was fetched successfully.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::fmt;

use thiserror::Error;

/// Errors produced while parsing a VCS locator string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The locator string was empty.
    #[error("locator is an empty string")]
    EmptyLocator,

    /// The locator is not a well-formed URI.
    #[error("malformed locator {locator:?}: {message}")]
    BadUri { locator: String, message: String },

    /// The locator has a scheme but is not a valid URL.
    #[error("invalid url {locator:?}: {source}")]
    InvalidUrl {
        locator: String,
        #[source]
        source: url::ParseError,
    },

    /// A bare scheme (no `tool+` prefix) named a transport other than
    /// `https`, `ssh` or `file`.
    #[error("unsupported transport {transport:?} (expected https, ssh or file)")]
    UnsupportedTransport { transport: String },

    /// A `file` locator without a repository path.
    #[error("file locator {locator:?} has no repository path")]
    MissingFilePath { locator: String },
}

/// Main error type for vcslocator operations
#[derive(Error, Debug)]
pub enum Error {
    /// The locator could not be parsed.
    #[error("parsing locator: {0}")]
    Parse(#[from] ParseError),

    /// Only `git` locators can be fetched.
    #[error("only git locators are supported for cloning (got tool {tool:?})")]
    UnsupportedTool { tool: String },

    /// A single-file operation was requested on a locator without `#subpath`.
    #[error("locator {locator:?} has no subpath defined")]
    NoSubPath { locator: String },

    /// The locator transport cannot be turned into a clone URL.
    #[error("cannot build a repository url for transport {transport:?}")]
    NoRepositoryUrl { transport: String },

    /// Cloning the repository failed.
    ///
    /// Includes the repository URL, ref (branch/tag, empty for the default
    /// branch), error message, and an optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// The checkout directory already holds files.
    #[error("clone path {path:?} already exists and is not empty")]
    CloneTargetNotEmpty { path: String },

    /// Fetching an explicit refspec into an existing clone failed.
    #[error("Git fetch error for {url} ({refspec}): {message}")]
    GitFetch {
        url: String,
        refspec: String,
        message: String,
    },

    /// A revision could not be resolved to a commit hash.
    #[error("resolving revision {revision}: {message}")]
    ResolveRevision { revision: String, message: String },

    /// Checking out a resolved commit failed.
    #[error("checking out commit {commit}: {message}")]
    Checkout { commit: String, message: String },

    /// A requested path could not be opened inside the cloned repository.
    #[error("opening path {path:?}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Streaming file data to the destination failed.
    #[error("copying data stream from {path:?}: {source}")]
    Copy {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// One or more repositories of a batch could not be cloned. The copy
    /// phase never runs when this is returned.
    #[error("error cloning repositories: {}", join_errors(.0.iter()))]
    CloneBatch(Vec<Error>),

    /// Some locators of a batch failed; see the positional list.
    #[error("{0}")]
    Group(ErrorList),

    /// Batch input and output collections differ in length.
    #[error("number of writers ({writers}) does not match the number of VCS locators ({locators})")]
    WriterCountMismatch { locators: usize, writers: usize },

    /// An error occurred with a content filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// The worker pool could not be created.
    #[error("building worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn join_errors<'a>(errors: impl Iterator<Item = &'a Error>) -> String {
    errors
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Positional error collection for batch operations.
///
/// Always has one slot per locator of the batch. It is only ever built when
/// at least one slot holds an error.
#[derive(Debug)]
pub struct ErrorList {
    errors: Vec<Option<Error>>,
}

impl ErrorList {
    /// Builds the aggregate from per-index outcomes, returning `None` when
    /// every index succeeded.
    pub fn from_outcomes(outcomes: Vec<Option<Error>>) -> Option<Self> {
        if outcomes.iter().all(Option::is_none) {
            return None;
        }
        Some(Self { errors: outcomes })
    }

    /// The error recorded for index `i`, if that index failed.
    pub fn get(&self, i: usize) -> Option<&Error> {
        self.errors.get(i).and_then(Option::as_ref)
    }

    /// Indices of the locators that failed, in ascending order.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.errors
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| i))
            .collect()
    }

    /// Number of slots, equal to the size of the batch.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over all slots in batch order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Error>> {
        self.errors.iter().map(Option::as_ref)
    }

    pub fn into_inner(self) -> Vec<Option<Error>> {
        self.errors
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| format!("locator #{}: {}", i, e)))
            .collect::<Vec<_>>()
            .join("\n");
        f.write_str(&joined)
    }
}

impl std::error::Error for ErrorList {}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_error(path: &str) -> Error {
        Error::Open {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::UnsupportedTransport {
            transport: "http".to_string(),
        };
        assert!(err.to_string().contains("\"http\""));
        assert_eq!(
            ParseError::EmptyLocator.to_string(),
            "locator is an empty string"
        );
    }

    #[test]
    fn test_parse_error_converts_into_error() {
        let err: Error = ParseError::EmptyLocator.into();
        assert!(matches!(err, Error::Parse(ParseError::EmptyLocator)));
        assert!(err.to_string().starts_with("parsing locator"));
    }

    #[test]
    fn test_git_clone_display_with_hint() {
        let error = Error::GitClone {
            url: "https://github.com/example/repo".to_string(),
            r#ref: "main".to_string(),
            message: "Authentication failed".to_string(),
            hint: Some("Check your SSH keys".to_string()),
        };
        let display = error.to_string();
        assert!(display.contains("https://github.com/example/repo@main"));
        assert!(display.contains("hint: Check your SSH keys"));
    }

    #[test]
    fn test_error_list_none_when_all_succeeded() {
        assert!(ErrorList::from_outcomes(vec![None, None, None]).is_none());
        assert!(ErrorList::from_outcomes(vec![]).is_none());
    }

    #[test]
    fn test_error_list_is_positional() {
        let list =
            ErrorList::from_outcomes(vec![None, Some(open_error("missing.txt")), None]).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.get(0).is_none());
        assert!(list.get(1).is_some());
        assert!(list.get(2).is_none());
        assert!(list.get(3).is_none());
        assert_eq!(list.failed_indices(), vec![1]);
    }

    #[test]
    fn test_error_list_display_skips_successes() {
        let list = ErrorList::from_outcomes(vec![
            Some(open_error("a")),
            None,
            Some(open_error("b")),
        ])
        .unwrap();
        let display = list.to_string();
        assert_eq!(display.lines().count(), 2);
        assert!(display.contains("locator #0"));
        assert!(display.contains("locator #2"));
        assert!(!display.contains("locator #1"));
    }

    #[test]
    fn test_clone_batch_display_joins_errors() {
        let err = Error::CloneBatch(vec![
            Error::UnsupportedTool {
                tool: "hg".to_string(),
            },
            Error::NoRepositoryUrl {
                transport: "http".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.starts_with("error cloning repositories"));
        assert!(display.contains("\"hg\""));
        assert!(display.contains("\"http\""));
    }
}

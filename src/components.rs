//! The typed pieces of a parsed VCS locator.

use std::fmt;

use serde::Serialize;

use crate::defaults::SSH_USER;
use crate::refs::Revision;

pub const TRANSPORT_HTTPS: &str = "https";
pub const TRANSPORT_SSH: &str = "ssh";
pub const TRANSPORT_FILE: &str = "file";

/// How the repository is reached.
///
/// `Other` carries transports that are only accepted behind a `tool+`
/// prefix, such as `http`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transport {
    Https,
    Ssh,
    File,
    Other(String),
}

impl Transport {
    /// Maps a scheme token to a transport. Matching is exact; callers lower
    /// case the scheme first.
    pub fn from_scheme(s: &str) -> Self {
        match s {
            TRANSPORT_HTTPS => Transport::Https,
            TRANSPORT_SSH => Transport::Ssh,
            TRANSPORT_FILE => Transport::File,
            other => Transport::Other(other.to_string()),
        }
    }

    /// True for the transports usable without a `tool+` prefix.
    pub fn is_sanctioned(&self) -> bool {
        !matches!(self, Transport::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Transport::Https => TRANSPORT_HTTPS,
            Transport::Ssh => TRANSPORT_SSH,
            Transport::File => TRANSPORT_FILE,
            Transport::Other(s) => s,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Transport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Components captures the parsed pieces of a VCS locator.
///
/// At most one of commit, tag and branch is set, which the `revision` field
/// enforces by construction. `ref_string` keeps the raw token after `@`
/// whether or not it could be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Components {
    pub tool: String,
    pub transport: Transport,
    pub hostname: String,
    pub repo_path: String,
    pub ref_string: String,
    pub revision: Option<Revision>,
    /// Path of the requested file or directory relative to the repository
    /// root. Empty means the whole repository.
    pub sub_path: String,
}

impl Components {
    pub fn commit(&self) -> &str {
        match &self.revision {
            Some(Revision::Commit(c)) => c,
            _ => "",
        }
    }

    pub fn tag(&self) -> &str {
        match &self.revision {
            Some(Revision::Tag(t)) => t,
            _ => "",
        }
    }

    pub fn branch(&self) -> &str {
        match &self.revision {
            Some(Revision::Branch(b)) => b,
            _ => "",
        }
    }

    /// The branch or tag to clone, if any. Commits are checked out after
    /// cloning the default branch.
    pub fn clone_reference(&self) -> Option<&str> {
        match &self.revision {
            Some(Revision::Branch(name)) | Some(Revision::Tag(name)) => Some(name),
            _ => None,
        }
    }

    /// Forms the repository URL to clone.
    ///
    /// Returns `None` for transports git cannot be pointed at directly.
    pub fn repo_url(&self) -> Option<String> {
        let trimmed = self.repo_path.trim_start_matches('/');
        match &self.transport {
            Transport::Https => Some(format!("https://{}/{}", self.hostname, trimmed)),
            Transport::Other(s) if s.is_empty() => {
                Some(format!("https://{}/{}", self.hostname, trimmed))
            }
            Transport::Ssh => Some(format!("{}@{}:{}", SSH_USER, self.hostname, trimmed)),
            Transport::File => Some(self.repo_path.clone()),
            Transport::Other(_) => None,
        }
    }
}

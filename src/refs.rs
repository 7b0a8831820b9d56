//! Classification of the revision token found after `@` in a locator.
//!
//! The token is classified as a commit, tag or branch using these rules, in
//! priority order:
//!
//! 1. A 40 or 7 character lowercase hex string is a commit.
//! 2. `refs/tags/<name>` is a tag and `refs/heads/<name>` a branch, even when
//!    `<name>` looks like a hash.
//! 3. Any other token is a branch when the caller asked for refs to be read
//!    as branches, otherwise a tag. When reading refs as tags, tokens under
//!    a different `refs/` namespace (e.g. `refs/notes/x`) stay unclassified.
//!
//! A 7 character tag or branch made only of lowercase hex digits is read as
//! a commit. Use the fully qualified `refs/...` form for those.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const TAGS_PREFIX: &str = "refs/tags/";
const HEADS_PREFIX: &str = "refs/heads/";
const REFS_PREFIX: &str = "refs/";

static SHA1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{40}$").expect("valid sha1 pattern"));

static SHA1_SHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{7}$").expect("valid short sha1 pattern"));

/// A classified revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Revision {
    Commit(String),
    Tag(String),
    Branch(String),
}

impl Revision {
    pub fn name(&self) -> &str {
        match self {
            Revision::Commit(s) | Revision::Tag(s) | Revision::Branch(s) => s,
        }
    }
}

/// Returns true when `token` looks like a full or abbreviated commit hash.
pub fn is_commit_hash(token: &str) -> bool {
    SHA1_RE.is_match(token) || SHA1_SHORT_RE.is_match(token)
}

/// Classifies a raw revision token.
///
/// Returns `None` for an empty token and for fully qualified refs outside
/// `refs/tags/` and `refs/heads/`.
pub fn classify(token: &str, ref_is_branch: bool) -> Option<Revision> {
    if token.is_empty() {
        return None;
    }

    if let Some(tag) = token.strip_prefix(TAGS_PREFIX) {
        return Some(Revision::Tag(tag.to_string()));
    }
    if let Some(branch) = token.strip_prefix(HEADS_PREFIX) {
        return Some(Revision::Branch(branch.to_string()));
    }

    if is_commit_hash(token) {
        return Some(Revision::Commit(token.to_string()));
    }

    if ref_is_branch {
        Some(Revision::Branch(token.to_string()))
    } else if !token.starts_with(REFS_PREFIX) {
        Some(Revision::Tag(token.to_string()))
    } else {
        None
    }
}

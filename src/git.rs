//! Thin wrappers around the system `git` command.
//!
//! Using the system binary means git's own configuration (credential
//! helpers, `~/.ssh/config`, proxies) keeps working. Credentials resolved by
//! [`crate::auth`] are layered on top through the environment only, so they
//! never show up in the process arguments or in the clone's `.git/config`.

use std::collections::hash_map::DefaultHasher;
use std::ffi::OsString;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::process::Command;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use walkdir::WalkDir;

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::filesystem::{File, MemoryFS};
use crate::repository::CloneRequest;

/// Clone a repository into `target_dir`.
///
/// `request.reference` selects a branch or tag; without one the remote's
/// default branch is cloned. `target_dir` must be missing or empty; git
/// refuses anything else and nothing here clears it.
pub fn clone(request: &CloneRequest<'_>, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut cmd = git_command(request.auth);
    cmd.arg("clone").arg("--quiet");
    if request.single_branch {
        cmd.arg("--single-branch");
    }
    if request.shallow {
        cmd.arg("--depth=1");
    }
    if let Some(reference) = request.reference {
        cmd.args(["--branch", reference]);
    }
    cmd.arg("--").arg(request.url).arg(target_dir);

    debug!(
        "git clone {} (ref: {}, shallow: {})",
        request.url,
        request.reference.unwrap_or("<default>"),
        request.shallow
    );

    run_git(cmd).map(|_| ()).map_err(|stderr| Error::GitClone {
        url: request.url.to_string(),
        r#ref: request.reference.unwrap_or_default().to_string(),
        hint: auth_hint(&stderr),
        message: stderr,
    })
}

/// Fetch `refspec` from `origin` into an existing clone.
pub fn fetch(repo_dir: &Path, url: &str, refspec: &str, auth: Option<&Credential>) -> Result<()> {
    let mut cmd = git_command(auth);
    cmd.arg("-C")
        .arg(repo_dir)
        .args(["fetch", "--quiet", "origin", refspec]);

    debug!("git fetch origin {} ({})", refspec, url);
    run_git(cmd).map(|_| ()).map_err(|message| Error::GitFetch {
        url: url.to_string(),
        refspec: refspec.to_string(),
        message,
    })
}

/// Resolve a revision to a full commit hash.
pub fn resolve_revision(repo_dir: &Path, revision: &str) -> Result<String> {
    let mut cmd = git_command(None);
    cmd.arg("-C")
        .arg(repo_dir)
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("{}^{{commit}}", revision));

    let stdout = run_git(cmd).map_err(|stderr| Error::ResolveRevision {
        revision: revision.to_string(),
        message: if stderr.is_empty() {
            "revision not found".to_string()
        } else {
            stderr
        },
    })?;
    Ok(stdout.trim().to_string())
}

/// Check out a commit, detaching HEAD.
pub fn checkout(repo_dir: &Path, commit: &str) -> Result<()> {
    let mut cmd = git_command(None);
    cmd.arg("-C")
        .arg(repo_dir)
        .args(["checkout", "--quiet", "--detach", commit]);

    run_git(cmd).map(|_| ()).map_err(|message| Error::Checkout {
        commit: commit.to_string(),
        message,
    })
}

/// Load a checked-out worktree into a MemoryFS, skipping `.git`.
pub fn load_worktree(dir: &Path) -> Result<MemoryFS> {
    let mut fs = MemoryFS::new();

    let walker = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");
    for entry in walker {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative_path) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let content = fs::read(entry.path())?;
        let metadata = entry.metadata().map_err(|e| Error::Filesystem {
            message: e.to_string(),
        })?;

        fs.add_file(
            relative_path,
            File {
                content,
                permissions: file_mode(&metadata),
                modified_time: metadata
                    .modified()
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
            },
        );
    }

    Ok(fs)
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> u32 {
    0o644
}

/// Directory name for a checkout of `url` at `ref_name`.
///
/// The hash covers both the URL and the exact ref, so refs that only differ
/// in characters replaced by the readable suffix (`feature/x` and
/// `feature-x`) still get their own directory.
pub fn clone_dir_name(url: &str, ref_name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    ref_name.hash(&mut hasher);
    let hash = format!("{:016x}", hasher.finish());

    if ref_name.is_empty() {
        return hash;
    }
    let safe_ref = ref_name.replace(['/', '\\', ':'], "-");
    format!("{}-{}", hash, safe_ref)
}

fn git_command(auth: Option<&Credential>) -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    for (key, value) in auth_env(auth) {
        cmd.env(key, value);
    }
    cmd
}

/// Environment variables carrying the credential to git.
fn auth_env(auth: Option<&Credential>) -> Vec<(&'static str, OsString)> {
    match auth {
        None => Vec::new(),
        Some(Credential::SshAgent { socket }) => {
            vec![("SSH_AUTH_SOCK", socket.clone().into_os_string())]
        }
        Some(Credential::SshKey { path }) => vec![(
            "GIT_SSH_COMMAND",
            format!(
                "ssh -i {} -o IdentitiesOnly=yes",
                shell_quote(&path.to_string_lossy())
            )
            .into(),
        )],
        Some(Credential::Basic { username, password }) => {
            let token = STANDARD.encode(format!("{}:{}", username, password));
            vec![
                ("GIT_CONFIG_COUNT", "1".into()),
                ("GIT_CONFIG_KEY_0", "http.extraHeader".into()),
                (
                    "GIT_CONFIG_VALUE_0",
                    format!("Authorization: Basic {}", token).into(),
                ),
            ]
        }
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Runs git, returning stdout on success and stderr on failure.
fn run_git(mut cmd: Command) -> std::result::Result<String, String> {
    let output = cmd.output().map_err(|e| e.to_string())?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

/// Provide helpful hints for common auth failures
fn auth_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
        || stderr.contains("could not read Username")
    {
        Some(
            "make sure you have access to the repository: load your SSH key into \
             ssh-agent, or pass --http-username/--http-password for https"
                .to_string(),
        )
    } else {
        None
    }
}

//! # Credential Resolution
//!
//! Works out which credentials to hand to `git` for a locator, mimicking
//! git's own behaviour:
//!
//! - **ssh**: a running SSH agent wins; otherwise the first private key found
//!   among `~/.ssh/id_ed25519`, `id_ecdsa`, `id_rsa` and `id_dsa`.
//! - **https**: basic auth when a username or password is configured in
//!   [`Options`].
//! - **file** and anything else: no credentials.
//!
//! Finding nothing is not an error; `git` then falls back to its own
//! configuration (credential helpers, `~/.ssh/config`, ...).

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::components::{Components, Transport};
use crate::defaults::SSH_KEY_FILES;
use crate::error::Result;
use crate::options::Options;

/// Credentials forwarded to the repository provider.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Use the agent listening on this socket.
    SshAgent { socket: PathBuf },
    /// Use this private key file.
    SshKey { path: PathBuf },
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

impl Credential {
    /// Short description safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::SshAgent { .. } => "ssh-agent",
            Credential::SshKey { .. } => "ssh-key",
            Credential::Basic { .. } => "http-basic",
        }
    }
}

// Keep passwords out of debug output and logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::SshAgent { socket } => {
                f.debug_struct("SshAgent").field("socket", socket).finish()
            }
            Credential::SshKey { path } => f.debug_struct("SshKey").field("path", path).finish(),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Trait for credential discovery - allows mocking in tests
pub trait AuthResolver: Send + Sync {
    /// Returns the credential to use for the repository, or `None` to let
    /// `git` use its defaults.
    fn resolve(&self, components: &Components, options: &Options) -> Result<Option<Credential>>;
}

/// Resolves credentials from the environment and the user's `~/.ssh`.
#[derive(Debug, Clone, Default)]
pub struct DefaultAuthResolver {
    home: Option<PathBuf>,
    agent_socket: Option<PathBuf>,
    /// Use the explicit values above instead of the process environment.
    isolated: bool,
}

impl DefaultAuthResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver that never reads the process environment. Used to point
    /// key discovery at a fixture home directory.
    pub fn isolated(home: Option<PathBuf>, agent_socket: Option<PathBuf>) -> Self {
        Self {
            home,
            agent_socket,
            isolated: true,
        }
    }

    fn home_dir(&self) -> Option<PathBuf> {
        if self.isolated {
            self.home.clone()
        } else {
            dirs::home_dir()
        }
    }

    fn agent_socket(&self) -> Option<PathBuf> {
        let socket = if self.isolated {
            self.agent_socket.clone()
        } else {
            std::env::var_os("SSH_AUTH_SOCK").map(PathBuf::from)
        };
        socket.filter(|s| !s.as_os_str().is_empty() && s.exists())
    }

    fn ssh_credential(&self) -> Option<Credential> {
        if let Some(socket) = self.agent_socket() {
            return Some(Credential::SshAgent { socket });
        }

        let ssh_dir = self.home_dir()?.join(".ssh");
        find_ssh_key(&ssh_dir).map(|path| Credential::SshKey { path })
    }
}

impl AuthResolver for DefaultAuthResolver {
    fn resolve(&self, components: &Components, options: &Options) -> Result<Option<Credential>> {
        let credential = match components.transport {
            Transport::Ssh => self.ssh_credential(),
            Transport::Https => http_credential(options),
            Transport::File | Transport::Other(_) => None,
        };
        debug!(
            "credentials for {} transport: {}",
            components.transport,
            credential.as_ref().map_or("none", Credential::kind)
        );
        Ok(credential)
    }
}

/// Returns the first existing key file, in git's order of preference.
fn find_ssh_key(ssh_dir: &Path) -> Option<PathBuf> {
    SSH_KEY_FILES
        .iter()
        .map(|name| ssh_dir.join(name))
        .find(|path| path.is_file())
}

/// Builds basic-auth credentials from the options, if any are configured.
pub fn http_credential(options: &Options) -> Option<Credential> {
    if !options.has_http_credentials() {
        return None;
    }
    Some(Credential::Basic {
        username: options.http_username.clone().unwrap_or_default(),
        password: options.http_password.clone().unwrap_or_default(),
    })
}

//! # VCS Locator Parsing
//!
//! A VCS locator is a compact, URI-like string pointing at a file or
//! directory inside a repository at a given revision:
//!
//! ```text
//! [<tool>+]<transport>://<host>[/<repo-path>][@<ref>][#<subpath>]
//! <owner>/<repo>[@<ref>]                      (GitHub shorthand)
//! file://<path>[@<ref>][#<subpath>]           (local shorthand)
//! ```
//!
//! Without a `tool+` prefix the transport must be `https`, `ssh` or `file`.
//! With a prefix any transport string is carried through unchanged so the
//! wrapped tool can decide what to do with it.
//!
//! Parsing is pure: no I/O happens here. The result is a [`Components`]
//! value with the revision classified by [`crate::refs::classify`].
//!
//! ```
//! use vcslocator::{Locator, Options};
//!
//! let components = Locator::from("git+https://github.com/example/test@v1.0#README.md")
//!     .parse(&Options::default())
//!     .unwrap();
//! assert_eq!(components.hostname, "github.com");
//! assert_eq!(components.tag(), "v1.0");
//! assert_eq!(components.sub_path, "README.md");
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::{Host, Url};

use crate::components::{Components, Transport};
use crate::defaults::{DEFAULT_TOOL, SLUG_HOSTNAME};
use crate::error::ParseError;
use crate::options::Options;
use crate::refs::classify;

const FILE_PREFIX: &str = "file://";

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").expect("valid scheme pattern"));

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-A-Za-z0-9_]+/[-A-Za-z0-9_]+$").expect("valid slug pattern"));

/// Locator wraps a VCS locator string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the locator into its components.
    pub fn parse(&self, options: &Options) -> Result<Components, ParseError> {
        parse(&self.0, options)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Locator {
    type Err = ParseError;

    /// Builds a locator, rejecting strings that do not parse with default
    /// options.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, &Options::default())?;
        Ok(Self::from(s))
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded path, ref and subpath of a locator.
#[derive(Debug)]
struct PathParts {
    repo_path: String,
    ref_string: String,
    sub_path: String,
}

/// Parses a VCS locator string and returns its components.
pub fn parse(locator: &str, options: &Options) -> Result<Components, ParseError> {
    if locator.is_empty() {
        return Err(ParseError::EmptyLocator);
    }
    // url strips these silently
    if locator.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(bad_uri(locator, "invalid control character in URL"));
    }

    // The file shorthand is matched literally; what follows is a path, not
    // an authority.
    if let Some(rest) = locator.strip_prefix(FILE_PREFIX) {
        return parse_file(locator, rest, options);
    }

    match locator.split_once(':') {
        Some((scheme, _)) if SCHEME_RE.is_match(scheme) => parse_url(locator, options),
        _ => parse_slug(locator, options),
    }
}

fn parse_url(locator: &str, options: &Options) -> Result<Components, ParseError> {
    let url = Url::parse(locator).map_err(|source| ParseError::InvalidUrl {
        locator: locator.to_string(),
        source,
    })?;
    // url accepts `https:host/path` for special schemes
    let after_scheme = locator.split_once(':').map_or("", |(_, rest)| rest);
    if !after_scheme.starts_with("//") {
        return Err(bad_uri(locator, "missing \"//\" after scheme"));
    }

    let scheme = url.scheme();
    let (tool, transport) = match scheme.split_once('+') {
        Some((tool, transport)) => (tool.to_string(), Transport::from_scheme(transport)),
        None => {
            let transport = Transport::from_scheme(scheme);
            if !transport.is_sanctioned() {
                return Err(ParseError::UnsupportedTransport {
                    transport: scheme.to_string(),
                });
            }
            (String::new(), transport)
        }
    };

    let mut hostname = match url.host() {
        Some(Host::Domain(domain)) => decode(locator, domain)?,
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    };

    let PathParts {
        mut repo_path,
        ref_string,
        sub_path,
    } = split_ref(locator, url.path(), url.fragment().unwrap_or_default())?;

    if transport == Transport::File {
        if !hostname.is_empty() {
            repo_path = format!("{}{}", hostname, repo_path);
            hostname.clear();
        }
        if repo_path.is_empty() {
            return Err(ParseError::MissingFilePath {
                locator: locator.to_string(),
            });
        }
    }

    let revision = classify(&ref_string, options.ref_is_branch);
    Ok(Components {
        tool,
        transport,
        hostname,
        repo_path,
        ref_string,
        revision,
        sub_path,
    })
}

fn parse_file(locator: &str, rest: &str, options: &Options) -> Result<Components, ParseError> {
    let parts = split_path(locator, rest)?;
    if parts.repo_path.is_empty() {
        return Err(ParseError::MissingFilePath {
            locator: locator.to_string(),
        });
    }

    let revision = classify(&parts.ref_string, options.ref_is_branch);
    Ok(Components {
        tool: DEFAULT_TOOL.to_string(),
        transport: Transport::File,
        hostname: String::new(),
        repo_path: parts.repo_path,
        ref_string: parts.ref_string,
        revision,
        sub_path: parts.sub_path,
    })
}

/// `owner/repo[@ref][#subpath]`, the only form accepted without a scheme.
fn parse_slug(locator: &str, options: &Options) -> Result<Components, ParseError> {
    let path_end = locator.find(|c: char| c == '?' || c == '#').unwrap_or(locator.len());
    if locator[..path_end]
        .split('/')
        .next()
        .is_some_and(|segment| segment.contains(':'))
    {
        return Err(bad_uri(
            locator,
            "first path segment in URL cannot contain colon",
        ));
    }

    let parts = split_path(locator, locator)?;
    if !SLUG_RE.is_match(&parts.repo_path) {
        return Err(ParseError::UnsupportedTransport {
            transport: String::new(),
        });
    }

    let revision = classify(&parts.ref_string, options.ref_is_branch);
    Ok(Components {
        tool: DEFAULT_TOOL.to_string(),
        transport: Transport::Https,
        hostname: SLUG_HOSTNAME.to_string(),
        repo_path: parts.repo_path,
        ref_string: parts.ref_string,
        revision,
        sub_path: parts.sub_path,
    })
}

/// Splits `path[?query][#fragment]`, dropping the query.
fn split_path(locator: &str, s: &str) -> Result<PathParts, ParseError> {
    let (s, fragment) = s.split_once('#').unwrap_or((s, ""));
    let path = s.split_once('?').map_or(s, |(path, _)| path);
    split_ref(locator, path, fragment)
}

/// Splits the path at its first literal `@` and decodes every piece.
fn split_ref(locator: &str, path: &str, fragment: &str) -> Result<PathParts, ParseError> {
    let (raw_path, raw_ref) = path.split_once('@').unwrap_or((path, ""));
    Ok(PathParts {
        repo_path: decode(locator, raw_path)?,
        ref_string: decode(locator, raw_ref)?,
        sub_path: decode(locator, fragment)?,
    })
}

/// Percent-decodes `s`. Malformed escapes and non UTF-8 results are errors.
fn decode(locator: &str, s: &str) -> Result<String, ParseError> {
    let bytes = s.as_bytes();
    for (i, _) in s.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            let end = (i + 3).min(bytes.len());
            return Err(bad_uri(
                locator,
                format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&bytes[i..end])
                ),
            ));
        }
    }

    percent_decode_str(s)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| bad_uri(locator, "escaped bytes are not valid UTF-8"))
}

fn bad_uri(locator: &str, message: impl Into<String>) -> ParseError {
    ParseError::BadUri {
        locator: locator.to_string(),
        message: message.into(),
    }
}

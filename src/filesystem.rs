//! Content filesystems: read access to a checked-out repository.
//!
//! A clone either lives in memory ([`MemoryFS`]) or on disk ([`DiskFS`]).
//! Both are exposed through the [`ContentFs`] trait so the fetch layer does
//! not care where the bytes come from.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Read-only view over the files of a checked-out repository.
///
/// Paths are relative to the repository root and use `/` separators. A
/// leading `/` is ignored; `..` segments are rejected.
pub trait ContentFs: Send + Sync + std::fmt::Debug {
    /// Opens a regular file for reading.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send + '_>>;

    /// Lists every regular file, sorted, relative to the repository root.
    fn files(&self) -> Result<Vec<PathBuf>>;
}

/// Normalizes a repository-relative path.
pub fn normalize_path(path: &str) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(Error::Open {
                    path: path.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "path escapes the repository root",
                    ),
                });
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(Error::Open {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty path"),
        });
    }
    Ok(normalized)
}

fn not_found(path: &str) -> Error {
    Error::Open {
        path: path.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "file does not exist"),
    }
}

/// Represents a file with content and metadata
#[derive(Debug, Clone)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions (simplified as u32)
    pub permissions: u32,
    /// File modification time
    pub modified_time: SystemTime,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: 0o644,
            modified_time: SystemTime::now(),
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// In-memory snapshot of a repository worktree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    /// Files stored as path -> content mapping
    files: HashMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) {
        self.files.insert(path.as_ref().to_path_buf(), file);
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ContentFs for MemoryFS {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send + '_>> {
        let normalized = normalize_path(path)?;
        let file = self.files.get(&normalized).ok_or_else(|| not_found(path))?;
        Ok(Box::new(file.content.as_slice()))
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }
}

/// A checkout on the local disk. The `.git` directory is hidden.
#[derive(Debug, Clone)]
pub struct DiskFS {
    root: PathBuf,
}

impl DiskFS {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentFs for DiskFS {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send + '_>> {
        let normalized = normalize_path(path)?;
        if normalized.starts_with(".git") {
            return Err(not_found(path));
        }
        let full_path = self.root.join(&normalized);
        if !full_path.is_file() {
            return Err(not_found(path));
        }
        let file = fs::File::open(&full_path).map_err(|source| Error::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");
        for entry in walker {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                paths.push(relative.to_path_buf());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

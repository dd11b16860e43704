//! Stage manifests: ordered path lists handed from one stage to the next.
//!
//! A manifest is the only "storage" the pipeline has. It is modelled as a
//! first-class ordered sequence of paths bound to a file location, read and
//! written explicitly. Stages truncate and rewrite their manifest in one
//! store, never appending across runs, so a rerun after a partial failure
//! converges instead of accumulating stale or duplicate entries.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered list of file paths bound to an on-disk manifest file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<PathBuf>,
}

impl Manifest {
    /// Create an empty manifest bound to `path`
    ///
    /// Nothing touches the filesystem until [`store`](Self::store).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Load a manifest from disk, one path per line
    ///
    /// Surrounding whitespace is stripped and blank lines are ignored.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        Ok(Self { path, entries })
    }

    /// The manifest's own location on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The listed paths, in order
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Number of listed paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest lists no paths
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `entry` is already listed
    pub fn contains(&self, entry: &Path) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    /// Append a path to the in-memory list
    pub fn push(&mut self, entry: impl Into<PathBuf>) {
        self.entries.push(entry.into());
    }

    /// Persist the manifest, truncating any previous contents
    ///
    /// The parent directory is created if needed.
    pub fn store(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = String::new();
        for entry in &self.entries {
            body.push_str(&entry.to_string_lossy());
            body.push('\n');
        }
        fs::write(&self.path, body)?;
        Ok(())
    }

    /// Completion-predicate check over the loaded entries
    ///
    /// True when every listed path is an existing, non-empty file with the
    /// required extension (without the dot). An empty manifest is vacuously
    /// valid, matching the stage predicates it backs.
    pub fn validate(&self, required_ext: &str) -> bool {
        self.entries
            .iter()
            .all(|entry| entry_is_valid(entry, required_ext))
    }

    /// Load the manifest at `path` and validate it in one step
    ///
    /// A missing or unreadable manifest is simply not valid; I/O trouble
    /// here means "incomplete", not "failed", so no error surfaces.
    pub fn validate_on_disk(path: &Path, required_ext: &str) -> bool {
        match Self::load(path) {
            Ok(manifest) => manifest.validate(required_ext),
            Err(_) => false,
        }
    }
}

fn entry_is_valid(path: &Path, required_ext: &str) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    metadata.is_file()
        && metadata.len() > 0
        && path.extension().and_then(|e| e.to_str()) == Some(required_ext)
}

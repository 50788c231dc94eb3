//! Write-once cache artifacts.
//!
//! # Caching Strategy
//!
//! ```text
//! <cache dir>/
//! └── <identifier>.css   written on first miss, never rewritten
//! ```
//!
//! Existence alone decides reuse; there is no fingerprint or freshness check.
//! Delete the file (or the directory) to force a rebuild.
//!
//! Writes go to a temporary file in the cache directory which is then
//! persisted without clobbering. Two concurrent first requests may both
//! compile, but only the first persist lands and readers never observe a
//! partially written artifact.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Directory holding compiled artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    /// Wrap a cache directory. It does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<identifier>.css`. The identifier is used verbatim.
    pub fn artifact_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{identifier}.css"))
    }

    /// Whether an artifact exists for `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.artifact_path(identifier).exists()
    }

    /// Read a cached artifact, `None` if absent.
    pub fn read(&self, identifier: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.artifact_path(identifier)) {
            Ok(css) => Ok(Some(css)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write `css` unless an artifact already exists.
    ///
    /// Creates the directory (recursively) if needed. Returns `true` if this
    /// call created the artifact, `false` if one was already there.
    pub fn write_once(&self, identifier: &str, css: &str) -> io::Result<bool> {
        let path = self.artifact_path(identifier);
        if path.exists() {
            return Ok(false);
        }

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(css.as_bytes())?;
        file.flush()?;

        match file.persist_noclobber(&path) {
            Ok(_) => Ok(true),
            // Another writer got there first.
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(err.error),
        }
    }
}

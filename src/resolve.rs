//! Source file lookup.
//!
//! A source name resolves to the first existing file among
//! [`PREFERRED_EXTENSIONS`] inside the source folder. Names with no match are
//! dropped, not reported.

use std::path::{Path, PathBuf};

use crate::diagnostic::ConfigError;

/// Extensions tried for each source name, in priority order.
pub const PREFERRED_EXTENSIONS: [&str; 2] = ["less", "css"];

/// Resolve one source name to an existing file.
pub fn resolve_source(folder: &Path, name: &str) -> Option<PathBuf> {
    PREFERRED_EXTENSIONS
        .iter()
        .map(|ext| folder.join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
}

/// Resolve names in order, skipping any without a file.
pub fn resolve_sources<S: AsRef<str>>(folder: &Path, names: &[S]) -> Vec<PathBuf> {
    names
        .iter()
        .filter_map(|name| resolve_source(folder, name.as_ref()))
        .collect()
}

/// Check a required folder option: non-empty and existing.
pub(crate) fn required_folder(key: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingPath { key });
    }
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            key,
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            key,
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

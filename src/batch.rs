//! Parallel compilation of many stylesheets.
//!
//! Use [`Batcher`] to warm the cache at startup so the first real requests
//! are served from disk:
//!
//! ```ignore
//! let stylesheets = Stylesheets::new(config, "app/stylesheets")?;
//! for (name, result) in Batcher::new(&stylesheets).warm_combinations() {
//!     if let Err(err) = result {
//!         eprintln!("{name}: {err}");
//!     }
//! }
//! ```
//!
//! Each identifier gets its own [`Source`](crate::Source). Identifiers that
//! race on the same artifact both compile; only one write lands.

use rayon::prelude::*;
use tracing::info;

use crate::compile::Stylesheets;
use crate::diagnostic::Result;

/// Result for one identifier.
pub type BatchResult = (String, Result<String>);

/// Compiles identifiers in parallel against shared [`Stylesheets`].
#[derive(Debug, Clone, Copy)]
pub struct Batcher<'a> {
    stylesheets: &'a Stylesheets,
}

impl<'a> Batcher<'a> {
    /// Create a batcher.
    pub fn new(stylesheets: &'a Stylesheets) -> Self {
        Self { stylesheets }
    }

    /// Compile every identifier. Results keep input order.
    pub fn compile_all<S: AsRef<str> + Sync>(&self, names: &[S]) -> Vec<BatchResult> {
        let results: Vec<BatchResult> = names
            .par_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.stylesheets.compile(name))
            })
            .collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(
            target = "less_batch::batch",
            total = results.len(),
            failed,
            "Batch compilation finished"
        );
        results
    }

    /// Compile every configured combination, sorted by name.
    pub fn warm_combinations(&self) -> Vec<BatchResult> {
        let mut names: Vec<&str> = self
            .stylesheets
            .config()
            .combinations()
            .keys()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        self.compile_all(&names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::diagnostic::CompileError;
    use crate::engine::Toolchain;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn stylesheets(dir: &Path, cache: &Path) -> Stylesheets {
        fs::write(dir.join("reset.css"), "r{}").unwrap();
        fs::write(dir.join("app.less"), "a{}").unwrap();
        fs::write(dir.join("broken.less"), "!").unwrap();

        let config = ConfigBuilder::new()
            .cache_dir(cache)
            .combination("web", ["reset", "app"])
            .combination("mobile", ["reset"])
            .combination("bad", ["broken"])
            .build()
            .unwrap();
        let toolchain = Toolchain::new(|path: &Path| -> Result<String, CompileError> {
            let body = fs::read_to_string(path).map_err(|e| CompileError::new(path, e.to_string()))?;
            if body == "!" {
                return Err(CompileError::new(path, "Unrecognised input").at(1, 1));
            }
            Ok(body)
        });
        Stylesheets::new(config, dir).unwrap().with_toolchain(toolchain)
    }

    #[test]
    fn test_compile_all_keeps_order() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let stylesheets = stylesheets(dir.path(), cache.path());

        let results = Batcher::new(&stylesheets).compile_all(&["app", "web", "reset", "app"]);
        let names: Vec<_> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["app", "web", "reset", "app"]);
        assert_eq!(results[1].1.as_deref().unwrap(), "r{}\na{}");
        assert_eq!(
            fs::read_to_string(cache.path().join("app.css")).unwrap(),
            "a{}"
        );
    }

    #[test]
    fn test_warm_combinations() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let stylesheets = stylesheets(dir.path(), cache.path());

        let results = Batcher::new(&stylesheets).warm_combinations();
        let names: Vec<_> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["bad", "mobile", "web"]);

        assert!(results[0].1.as_ref().unwrap_err().is_compile());
        assert!(!cache.path().join("bad.css").exists());
        assert!(cache.path().join("mobile.css").exists());
        assert!(cache.path().join("web.css").exists());
    }
}

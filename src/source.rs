//! Per-request stylesheet resolution and compilation.
//!
//! A [`Source`] turns one identifier into CSS:
//!
//! ```text
//! identifier ─┬─ direct source? ──────────────┐
//!             └─ else combination members ────┤
//!                                             ▼
//!                  compile each file, join with "\n"
//!                                             ▼
//!                  compress (none | whitespace | external)
//!                                             ▼
//!                  write <cache>/<identifier>.css if absent
//! ```
//!
//! The file list and the compiled text are computed at most once per
//! instance. Create a fresh `Source` per request; the on-disk cache is the
//! only state shared between instances.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::cache::CacheDir;
use crate::config::{validate_cache_dir, Compression, Config};
use crate::diagnostic::Result;
use crate::engine::Toolchain;
use crate::resolve::{required_folder, resolve_sources};

/// One stylesheet request.
#[derive(Debug)]
pub struct Source<'a> {
    name: String,
    folder: PathBuf,
    compression: Compression,
    cache: Option<CacheDir>,
    config: &'a Config,
    toolchain: &'a Toolchain,
    files: Option<Vec<PathBuf>>,
    from_combination: bool,
    compiled: Option<String>,
}

impl<'a> Source<'a> {
    /// Create a request for `name`, reading sources from `folder`.
    ///
    /// Compression and caching default to the configuration's settings.
    /// Fails if `folder` is empty or does not exist.
    pub fn new(
        name: impl Into<String>,
        folder: impl AsRef<Path>,
        config: &'a Config,
        toolchain: &'a Toolchain,
    ) -> Result<Self> {
        let folder = required_folder("folder", folder.as_ref())?;
        Ok(Self {
            name: name.into(),
            folder,
            compression: config.compression(),
            cache: config.cache_dir().map(CacheDir::new),
            config,
            toolchain,
            files: None,
            from_combination: false,
            compiled: None,
        })
    }

    /// Override the compression mode.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Override the cache directory; `None` disables caching.
    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &dir {
            validate_cache_dir(dir)?;
        }
        self.cache = dir.map(CacheDir::new);
        Ok(self)
    }

    /// The requested identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Compression mode in effect.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Whether output is written to the cache.
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Where the artifact for this identifier lives, when caching.
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache
            .as_ref()
            .map(|cache| cache.artifact_path(&self.name))
    }

    /// Source files for this identifier, in concatenation order.
    ///
    /// A direct source always wins over a combination with the same name;
    /// the combination table is consulted only when no direct file exists.
    pub fn files(&mut self) -> &[PathBuf] {
        if self.files.is_none() {
            let (files, from_combination) = self.resolve_files();
            debug!(
                target = "less_batch::source",
                name = %self.name,
                count = files.len(),
                from_combination,
                "Resolved source files"
            );
            self.files = Some(files);
            self.from_combination = from_combination;
        }
        self.files.as_deref().unwrap_or_default()
    }

    /// Whether this identifier came from a combination (no direct source).
    ///
    /// Resolves the files first if needed.
    pub fn is_combination(&mut self) -> bool {
        self.files();
        self.from_combination
    }

    /// Compile, compress and (when caching) persist this stylesheet.
    ///
    /// Runs at most once per instance; later calls return the same text.
    /// An existing artifact is never rewritten, but the returned text is
    /// always freshly compiled.
    pub fn compile(&mut self) -> Result<&str> {
        if self.compiled.is_none() {
            let css = self.compile_uncached()?;
            self.compiled = Some(css);
        }
        Ok(self.compiled.as_deref().unwrap_or_default())
    }

    /// Consume the request, returning the compiled text.
    pub fn into_css(mut self) -> Result<String> {
        self.compile()?;
        Ok(self.compiled.unwrap_or_default())
    }

    fn compile_uncached(&mut self) -> Result<String> {
        let started_at = Instant::now();
        let files = self.files().to_vec();

        let compiler = self.toolchain.compiler();
        let parts = files
            .iter()
            .map(|path| compiler.compile_file(path))
            .collect::<Result<Vec<_>>>()?;

        let css = self.toolchain.compress(parts.join("\n"), self.compression)?;

        let result = match &self.cache {
            Some(cache) if cache.write_once(&self.name, &css)? => "cache_write",
            Some(_) => "cache_exists",
            None => "uncached",
        };

        info!(
            target = "less_batch::source",
            name = %self.name,
            files = files.len(),
            compression = ?self.compression,
            result,
            css_bytes = css.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Compiled stylesheet"
        );
        Ok(css)
    }

    /// Files plus whether they came from the combination table.
    fn resolve_files(&self) -> (Vec<PathBuf>, bool) {
        let direct = resolve_sources(&self.folder, &[self.name.as_str()]);
        if !direct.is_empty() {
            return (direct, false);
        }
        match self.config.combination(&self.name) {
            Some(members) => (resolve_sources(&self.folder, members), true),
            None => (Vec::new(), false),
        }
    }
}

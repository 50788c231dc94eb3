//! High-level API for serving stylesheets.
//!
//! [`Stylesheets`] bundles a [`Config`], a source folder and a [`Toolchain`],
//! and creates one [`Source`] per request.
//!
//! # Example
//!
//! ```ignore
//! use less_batch::{Config, Response, Stylesheets};
//!
//! let config = Config::from_json_file("less.json")?;
//! let stylesheets = Stylesheets::new(config, "app/stylesheets")?;
//!
//! match stylesheets.respond("web")? {
//!     Some(Response::Css(css)) => { /* 200 text/css */ }
//!     Some(Response::Cached { path, .. }) => { /* serve the static file at `path` */ }
//!     None => { /* 404 */ }
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::config::{Config, StylesheetRef};
use crate::diagnostic::Result;
use crate::engine::Toolchain;
use crate::resolve::required_folder;
use crate::source::Source;

/// Content type of every response body.
pub const CSS_CONTENT_TYPE: &str = "text/css";

/// What an HTTP adapter should send for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Compiled CSS to send inline.
    Css(String),
    /// A cached combination: serve the artifact as a static file.
    Cached {
        /// Artifact filename, e.g. `web.css`.
        filename: String,
        /// Artifact location on disk.
        path: PathBuf,
    },
}

impl Response {
    /// Content type for the body.
    pub fn content_type(&self) -> &'static str {
        CSS_CONTENT_TYPE
    }
}

/// Shared configuration, source folder and toolchain.
#[derive(Debug)]
pub struct Stylesheets {
    config: Config,
    folder: PathBuf,
    toolchain: Toolchain,
}

impl Stylesheets {
    /// Serve sources from `folder` with the default toolchain.
    ///
    /// Fails if `folder` is empty or does not exist.
    pub fn new(config: Config, folder: impl AsRef<Path>) -> Result<Self> {
        let folder = required_folder("folder", folder.as_ref())?;
        Ok(Self {
            config,
            folder,
            toolchain: Toolchain::default(),
        })
    }

    /// Replace the toolchain.
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Source folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The toolchain.
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Start a request for `name`.
    pub fn source(&self, name: impl Into<String>) -> Result<Source<'_>> {
        Source::new(name, &self.folder, &self.config, &self.toolchain)
    }

    /// Compile `name` to CSS.
    ///
    /// An identifier with no resolvable source yields `""` and leaves the
    /// cache alone, so a file added later is still picked up.
    pub fn compile(&self, name: &str) -> Result<String> {
        let mut source = self.source(name)?;
        if source.files().is_empty() {
            return Ok(String::new());
        }
        source.into_css()
    }

    /// Reference for templates; see [`Config::stylesheet_reference`].
    pub fn reference(&self, key: &str) -> StylesheetRef {
        self.config.stylesheet_reference(key)
    }

    /// Resolve a request into a response.
    ///
    /// `None` when no source file resolves. A combination under caching is
    /// compiled (populating the cache if needed) and answered with the
    /// artifact; everything else is answered inline.
    pub fn respond(&self, name: &str) -> Result<Option<Response>> {
        let mut source = self.source(name)?;
        if source.files().is_empty() {
            return Ok(None);
        }

        let is_combination = source.is_combination();
        let cache_path = source.cache_path();
        let css = source.into_css()?;

        let response = match cache_path {
            Some(path) if is_combination => Response::Cached {
                filename: format!("{name}.css"),
                path,
            },
            _ => Response::Css(css),
        };
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::diagnostic::CompileError;
    use std::fs;
    use tempfile::TempDir;

    fn raw_toolchain() -> Toolchain {
        Toolchain::new(|path: &Path| -> Result<String, CompileError> {
            fs::read_to_string(path).map_err(|e| CompileError::new(path, e.to_string()))
        })
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("reset.css"), "r{}").unwrap();
        fs::write(dir.path().join("app.less"), "a{}").unwrap();
        dir
    }

    fn web() -> ConfigBuilder {
        ConfigBuilder::new().combination("web", ["reset", "app"])
    }

    #[test]
    fn test_new_requires_folder() {
        assert!(Stylesheets::new(Config::default(), "/no/such/folder").is_err());
    }

    #[test]
    fn test_compile() {
        let dir = fixture();
        let stylesheets = Stylesheets::new(web().build().unwrap(), dir.path())
            .unwrap()
            .with_toolchain(raw_toolchain());
        assert_eq!(stylesheets.compile("web").unwrap(), "r{}\na{}");
        assert_eq!(stylesheets.compile("app").unwrap(), "a{}");
    }

    #[test]
    fn test_respond_inline_without_cache() {
        let dir = fixture();
        let stylesheets = Stylesheets::new(web().build().unwrap(), dir.path())
            .unwrap()
            .with_toolchain(raw_toolchain());

        let response = stylesheets.respond("web").unwrap().unwrap();
        assert_eq!(response, Response::Css("r{}\na{}".into()));
        assert_eq!(response.content_type(), "text/css");
    }

    #[test]
    fn test_respond_cached_combination() {
        let dir = fixture();
        let cache = TempDir::new().unwrap();
        let config = web().cache_dir(cache.path()).build().unwrap();
        let stylesheets = Stylesheets::new(config, dir.path())
            .unwrap()
            .with_toolchain(raw_toolchain());

        let response = stylesheets.respond("web").unwrap().unwrap();
        let Response::Cached { filename, path } = response else {
            panic!("expected cached response");
        };
        assert_eq!(filename, "web.css");
        assert_eq!(path, cache.path().join("web.css"));
        assert_eq!(fs::read_to_string(path).unwrap(), "r{}\na{}");

        // Plain sources are still served inline, and cached as a side effect.
        let response = stylesheets.respond("app").unwrap().unwrap();
        assert_eq!(response, Response::Css("a{}".into()));
        assert!(cache.path().join("app.css").exists());
    }

    #[test]
    fn test_compile_unknown_does_not_cache() {
        let dir = fixture();
        let cache = TempDir::new().unwrap();
        let config = web().cache_dir(cache.path()).build().unwrap();
        let stylesheets = Stylesheets::new(config, dir.path())
            .unwrap()
            .with_toolchain(raw_toolchain());

        assert_eq!(stylesheets.compile("typo").unwrap(), "");
        assert!(!cache.path().join("typo.css").exists());

        fs::write(dir.path().join("typo.less"), "t{}").unwrap();
        assert_eq!(stylesheets.compile("typo").unwrap(), "t{}");
        assert_eq!(
            fs::read_to_string(cache.path().join("typo.css")).unwrap(),
            "t{}"
        );
    }

    #[test]
    fn test_respond_unknown() {
        let dir = fixture();
        let stylesheets = Stylesheets::new(web().build().unwrap(), dir.path())
            .unwrap()
            .with_toolchain(raw_toolchain());
        assert_eq!(stylesheets.respond("missing").unwrap(), None);
    }

    #[test]
    fn test_reference() {
        let dir = fixture();
        let stylesheets = Stylesheets::new(web().build().unwrap(), dir.path()).unwrap();
        assert_eq!(
            stylesheets.reference("web"),
            StylesheetRef::Multiple(vec!["reset.css".into(), "app.css".into()])
        );
        assert!(stylesheets.toolchain().minifier().is_some());
    }
}

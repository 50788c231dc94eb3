//! Configuration for less-batch.
//!
//! A [`Config`] holds the four settings that govern every compilation:
//! caching, compression, combinations and cache-busting. Build one with
//! [`ConfigBuilder`] (or load it from JSON) at application startup, then pass
//! it by reference to every [`Source`](crate::Source).
//!
//! It also renders stylesheet references for HTML templates:
//!
//! ```
//! use less_batch::config::{CacheBust, ConfigBuilder, StylesheetRef};
//!
//! let config = ConfigBuilder::new()
//!     .combination("web", ["reset", "app"])
//!     .cache_bust(CacheBust::Token("v2".into()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.stylesheet_filename("print"), "print.css?v2");
//! assert_eq!(
//!     config.stylesheet_reference("web"),
//!     StylesheetRef::Multiple(vec!["reset.css?v2".into(), "app.css?v2".into()]),
//! );
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::diagnostic::ConfigError;

/// How compiled CSS is compressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Leave output untouched.
    #[default]
    None,
    /// Strip every newline character.
    Whitespace,
    /// Run the external minifier.
    #[serde(alias = "yui", alias = "minifier")]
    External,
}

/// Query token appended to generated stylesheet filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheBust {
    /// No token.
    #[default]
    Off,
    /// Current Unix timestamp (seconds), taken when the filename is rendered.
    Timestamp,
    /// Fixed token, e.g. a release version.
    Token(String),
}

impl CacheBust {
    /// Whether a token is appended.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    fn token(&self) -> Option<String> {
        match self {
            Self::Off => None,
            Self::Timestamp => Some(chrono::Utc::now().timestamp().to_string()),
            Self::Token(token) => Some(token.clone()),
        }
    }
}

/// A rendered stylesheet reference.
///
/// A single combined resource, or one filename per combination member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetRef {
    /// One filename.
    Single(String),
    /// Several filenames, in concatenation order.
    Multiple(Vec<String>),
}

impl StylesheetRef {
    /// All filenames, in order.
    pub fn filenames(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Whether there is nothing to reference.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(name) => name.is_empty(),
            Self::Multiple(names) => names.is_empty(),
        }
    }
}

impl IntoIterator for StylesheetRef {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Single(name) => vec![name].into_iter(),
            Self::Multiple(names) => names.into_iter(),
        }
    }
}

/// Immutable runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    cache_dir: Option<PathBuf>,
    compression: Compression,
    combinations: FxHashMap<String, Vec<String>>,
    cache_bust: CacheBust,
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Whether compiled output is persisted to the cache directory.
    pub fn is_caching(&self) -> bool {
        self.cache_dir.is_some()
    }

    /// Whether compiled output is compressed.
    pub fn is_compressing(&self) -> bool {
        self.compression != Compression::None
    }

    /// Cache directory, when caching.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Compression mode.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Cache-bust mode.
    pub fn cache_bust(&self) -> &CacheBust {
        &self.cache_bust
    }

    /// The raw combination table.
    pub fn combinations(&self) -> &FxHashMap<String, Vec<String>> {
        &self.combinations
    }

    /// Members of one combination, in concatenation order.
    pub fn combination(&self, name: &str) -> Option<&[String]> {
        self.combinations.get(name).map(Vec::as_slice)
    }

    /// Reference for a combination.
    ///
    /// When caching, the combined resource is served from the cache under a
    /// single name. Otherwise each member is referenced on its own; unknown
    /// combinations yield an empty list.
    pub fn resolve_combination_target(&self, key: &str) -> StylesheetRef {
        if self.is_caching() {
            return StylesheetRef::Single(self.stylesheet_filename(key));
        }

        let members = self
            .combination(key)
            .unwrap_or_default()
            .iter()
            .map(|member| self.stylesheet_filename(member))
            .collect();
        StylesheetRef::Multiple(members)
    }

    /// Reference for any stylesheet key, combination or not.
    ///
    /// This is the entry point for templates rendering `<link>` tags.
    pub fn stylesheet_reference(&self, key: &str) -> StylesheetRef {
        if self.combinations.contains_key(key) {
            self.resolve_combination_target(key)
        } else {
            StylesheetRef::Single(self.stylesheet_filename(key))
        }
    }

    /// Filename for a stylesheet key.
    ///
    /// The key is trimmed and gets a `.css` suffix unless it already contains
    /// `.css`. With cache-busting on, `?<token>` is appended unless the name
    /// already has a query.
    pub fn stylesheet_filename(&self, key: &str) -> String {
        let mut filename = key.trim().to_string();
        if !filename.contains(".css") {
            filename.push_str(".css");
        }
        if !filename.contains('?')
            && let Some(token) = self.cache_bust.token()
        {
            filename.push('?');
            filename.push_str(&token);
        }
        filename
    }

    /// Parse a JSON configuration document.
    ///
    /// ```json
    /// {
    ///   "cache": "public/stylesheets",
    ///   "compress": "whitespace",
    ///   "combinations": { "web": ["reset", "common", "app_web"] },
    ///   "cache_bust": true
    /// }
    /// ```
    ///
    /// `compress: true` means whitespace; `cache_bust: true` means timestamp
    /// and a string is used as a fixed token. `cache` must name a directory:
    /// `"cache": true` alone is a [`ConfigError::MissingPath`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        file.into_builder()?.build()
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    cache_dir: Option<PathBuf>,
    compression: Compression,
    combinations: FxHashMap<String, Vec<String>>,
    cache_bust: CacheBust,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable caching into the given directory.
    ///
    /// The directory is created on first write if missing.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the compression mode.
    ///
    /// Default: [`Compression::None`]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Define a combination. Member order is concatenation order.
    pub fn combination<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.combinations
            .insert(name.into(), members.into_iter().map(Into::into).collect());
        self
    }

    /// Define several combinations at once.
    pub fn combinations<I, S>(mut self, combinations: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        self.combinations
            .extend(combinations.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Set the cache-bust mode.
    ///
    /// Default: [`CacheBust::Off`]
    pub fn cache_bust(mut self, cache_bust: CacheBust) -> Self {
        self.cache_bust = cache_bust;
        self
    }

    /// Validate and build the configuration.
    ///
    /// Fails when the cache path is empty or names an existing non-directory.
    pub fn build(self) -> Result<Config, ConfigError> {
        if let Some(dir) = &self.cache_dir {
            validate_cache_dir(dir)?;
        }
        Ok(Config {
            cache_dir: self.cache_dir,
            compression: self.compression,
            combinations: self.combinations,
            cache_bust: self.cache_bust,
        })
    }
}

/// A cache directory must be a directory, or absent so it can be created.
pub(crate) fn validate_cache_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingPath { key: "cache" });
    }
    if dir.exists() && !dir.is_dir() {
        return Err(ConfigError::NotADirectory {
            key: "cache",
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

// =============================================================================
// JSON document
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    cache: Option<CacheSetting>,
    compress: Option<CompressSetting>,
    combinations: FxHashMap<String, Vec<String>>,
    cache_bust: Option<CacheBustSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CacheSetting {
    Enabled(bool),
    Dir(PathBuf),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompressSetting {
    Enabled(bool),
    Mode(Compression),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CacheBustSetting {
    Enabled(bool),
    Token(String),
}

impl ConfigFile {
    fn into_builder(self) -> Result<ConfigBuilder, ConfigError> {
        let mut builder = ConfigBuilder::new().combinations(self.combinations);

        match self.cache {
            Some(CacheSetting::Dir(dir)) => builder = builder.cache_dir(dir),
            // Caching needs a directory to write to.
            Some(CacheSetting::Enabled(true)) => {
                return Err(ConfigError::MissingPath { key: "cache" });
            }
            Some(CacheSetting::Enabled(false)) | None => {}
        }

        builder = builder.compression(match self.compress {
            Some(CompressSetting::Enabled(true)) => Compression::Whitespace,
            Some(CompressSetting::Enabled(false)) | None => Compression::None,
            Some(CompressSetting::Mode(mode)) => mode,
        });

        Ok(builder.cache_bust(match self.cache_bust {
            Some(CacheBustSetting::Enabled(true)) => CacheBust::Timestamp,
            Some(CacheBustSetting::Enabled(false)) | None => CacheBust::Off,
            Some(CacheBustSetting::Token(token)) => CacheBust::Token(token),
        }))
    }
}

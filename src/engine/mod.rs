//! Compiler and minifier seams.
//!
//! The LESS → CSS transformation and CSS minification are delegated to
//! external tools. [`LessCompiler`] and [`Minifier`] are the seams; the
//! defaults shell out to `lessc` and `cleancss`. Closures implement both
//! traits, which is handy for tests and in-process engines.
//!
//! ```ignore
//! let toolchain = Toolchain::new(|path: &Path| {
//!     my_engine::compile(path).map_err(|e| CompileError::new(path, e.to_string()))
//! });
//! ```

mod command;
mod lessc;
mod minify;

use std::path::Path;

pub use lessc::LesscCompiler;
pub use minify::CommandMinifier;

use crate::config::Compression;
use crate::diagnostic::{CompileError, Error, Result};

/// Compiles a single LESS (or plain CSS) file to CSS.
pub trait LessCompiler: Send + Sync {
    /// Compile one file.
    ///
    /// Syntax errors are reported as [`Error::Compile`]; an absent compiler as
    /// [`Error::MissingDependency`].
    fn compile_file(&self, path: &Path) -> Result<String>;
}

impl<F> LessCompiler for F
where
    F: Fn(&Path) -> Result<String, CompileError> + Send + Sync,
{
    fn compile_file(&self, path: &Path) -> Result<String> {
        self(path).map_err(Error::from)
    }
}

/// Minifies CSS text.
pub trait Minifier: Send + Sync {
    /// Minify a stylesheet.
    fn minify(&self, css: &str) -> Result<String>;
}

impl<F> Minifier for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn minify(&self, css: &str) -> Result<String> {
        self(css)
    }
}

/// The compiler plus an optional minifier.
pub struct Toolchain {
    compiler: Box<dyn LessCompiler>,
    minifier: Option<Box<dyn Minifier>>,
}

impl Default for Toolchain {
    /// `lessc` and `cleancss` from `PATH`.
    fn default() -> Self {
        Self::new(LesscCompiler::default()).with_minifier(CommandMinifier::default())
    }
}

impl Toolchain {
    /// Toolchain with the given compiler and no minifier.
    pub fn new(compiler: impl LessCompiler + 'static) -> Self {
        Self {
            compiler: Box::new(compiler),
            minifier: None,
        }
    }

    /// Set the minifier used by [`Compression::External`].
    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Some(Box::new(minifier));
        self
    }

    /// Remove the minifier.
    pub fn without_minifier(mut self) -> Self {
        self.minifier = None;
        self
    }

    /// The compiler.
    pub fn compiler(&self) -> &dyn LessCompiler {
        self.compiler.as_ref()
    }

    /// The minifier, if installed.
    pub fn minifier(&self) -> Option<&dyn Minifier> {
        self.minifier.as_deref()
    }

    /// Apply `compression` to `css`.
    pub fn compress(&self, css: String, compression: Compression) -> Result<String> {
        compress(css, compression, self.minifier())
    }
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain")
            .field("compiler", &"<LessCompiler>")
            .field("minifier", &self.minifier.is_some())
            .finish()
    }
}

/// Apply a compression mode.
///
/// `Whitespace` removes every `\n`. `External` requires a minifier; without
/// one it fails with [`Error::MissingDependency`] instead of skipping.
pub fn compress(
    css: String,
    compression: Compression,
    minifier: Option<&dyn Minifier>,
) -> Result<String> {
    match compression {
        Compression::None => Ok(css),
        Compression::Whitespace => Ok(css.replace('\n', "")),
        Compression::External => match minifier {
            Some(minifier) => minifier.minify(&css),
            None => Err(Error::missing_dependency(
                minify::DEFAULT_PROGRAM,
                minify::INSTALL_HINT,
            )),
        },
    }
}

//! Error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for resolving, compiling and caching stylesheets.
///
/// # Example
///
/// ```ignore
/// match stylesheets.compile("web") {
///     Ok(css) => { /* serve */ }
///     Err(Error::Compile(err)) => {
///         eprintln!("{} line {:?}: {}", err.path.display(), err.line, err.message);
///     }
///     Err(err) if err.is_missing_dependency() => eprintln!("{err}"),
///     Err(err) => eprintln!("{err}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A source file failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// An optional external tool was requested but is not installed.
    #[error("`{name}` is not available. Install it with: {remedy}")]
    MissingDependency {
        /// Name of the missing tool.
        name: String,
        /// How to install it.
        remedy: String,
    },

    /// File I/O error (source reads, cache writes, tool invocation).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a missing dependency error.
    pub fn missing_dependency(name: impl Into<String>, remedy: impl Into<String>) -> Self {
        Self::MissingDependency {
            name: name.into(),
            remedy: remedy.into(),
        }
    }

    /// Whether this error reports an absent optional tool.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Whether this error is a source compile failure.
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Get the compile error, if any.
    pub fn as_compile(&self) -> Option<&CompileError> {
        match self {
            Self::Compile(err) => Some(err),
            _ => None,
        }
    }
}

/// Configuration error, raised when settings or required paths are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required path option was empty.
    #[error("no `{key}` option specified")]
    MissingPath {
        /// Option name.
        key: &'static str,
    },

    /// A required path does not exist.
    #[error("the `{key}` ('{}') does not exist", .path.display())]
    PathNotFound {
        /// Option name.
        key: &'static str,
        /// Offending path.
        path: PathBuf,
    },

    /// A path exists but is not a directory.
    #[error("the `{key}` ('{}') is not a directory", .path.display())]
    NotADirectory {
        /// Option name.
        key: &'static str,
        /// Offending path.
        path: PathBuf,
    },

    /// Configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single source file failed to compile.
///
/// Produced by a [`LessCompiler`](crate::LessCompiler). Propagated to the caller
/// untouched; nothing is written to the cache when it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Source file that failed.
    pub path: PathBuf,
    /// Compiler message (first line of its report).
    pub message: String,
    /// 1-based line, when the compiler reported one.
    pub line: Option<usize>,
    /// 1-based column, when the compiler reported one.
    pub column: Option<usize>,
}

impl CompileError {
    /// Create a compile error without location.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attach a location.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Build an error from the diagnostic output of a compiler process.
    ///
    /// The first non-empty line becomes the message. A trailing
    /// `on line N, column M` fragment is lifted into the location fields.
    pub fn from_output(path: impl Into<PathBuf>, output: &str) -> Self {
        let first = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("compilation failed");

        let (message, location) = split_location(first);
        let mut err = Self::new(path, message);
        if let Some((line, column)) = location {
            err = err.at(line, column);
        }
        err
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, ":{line}:{column}")?,
            (Some(line), None) => write!(f, ":{line}")?,
            _ => {}
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for CompileError {}

/// Split `"... on line 3, column 5:"` into the message and its location.
fn split_location(line: &str) -> (&str, Option<(usize, usize)>) {
    let Some(idx) = line.rfind(" on line ") else {
        return (line.trim_end_matches(':'), None);
    };

    let rest = line[idx + " on line ".len()..].trim_end_matches(':');
    let location = rest.split_once(", column ").and_then(|(l, c)| {
        let line = l.trim().parse().ok()?;
        let column = c.trim().parse().ok()?;
        Some((line, column))
    });

    match location {
        Some(loc) => (&line[..idx], Some(loc)),
        None => (line.trim_end_matches(':'), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_output_with_location() {
        let err = CompileError::from_output(
            "/styles/app.less",
            "ParseError: Unrecognised input in /styles/app.less on line 3, column 5:\n2 a {\n3   }}\n",
        );
        assert_eq!(
            err.message,
            "ParseError: Unrecognised input in /styles/app.less"
        );
        assert_eq!(err.line, Some(3));
        assert_eq!(err.column, Some(5));
        assert_eq!(
            err.to_string(),
            "/styles/app.less:3:5: ParseError: Unrecognised input in /styles/app.less"
        );
    }

    #[test]
    fn test_from_output_without_location() {
        let err = CompileError::from_output("a.less", "\n  NameError: variable @x is undefined\n");
        assert_eq!(err.message, "NameError: variable @x is undefined");
        assert_eq!(err.line, None);
        assert_eq!(err.to_string(), "a.less: NameError: variable @x is undefined");
    }

    #[test]
    fn test_from_output_empty() {
        let err = CompileError::from_output("a.less", "");
        assert_eq!(err.message, "compilation failed");
    }

    #[test]
    fn test_error_kinds() {
        let missing = Error::missing_dependency("cleancss", "npm install -g clean-css-cli");
        assert!(missing.is_missing_dependency());
        assert!(!missing.is_compile());
        assert_eq!(
            missing.to_string(),
            "`cleancss` is not available. Install it with: npm install -g clean-css-cli"
        );

        let compile = Error::from(CompileError::new("a.less", "boom"));
        assert!(compile.is_compile());
        assert!(!compile.is_missing_dependency());
        assert_eq!(compile.as_compile().map(|e| e.message.as_str()), Some("boom"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::PathNotFound {
            key: "folder",
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.to_string(), "the `folder` ('/nope') does not exist");
        assert_eq!(
            ConfigError::MissingPath { key: "folder" }.to_string(),
            "no `folder` option specified"
        );
    }
}

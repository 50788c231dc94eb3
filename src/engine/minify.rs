//! External CSS minifier.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::command::Tool;
use super::Minifier;
use crate::diagnostic::{Error, Result};

pub(crate) const DEFAULT_PROGRAM: &str = "cleancss";
pub(crate) const INSTALL_HINT: &str = "npm install -g clean-css-cli";

/// Minifies CSS by piping it through a command (`cleancss` by default).
///
/// The command must read CSS on stdin and write the result to stdout.
#[derive(Debug, Clone)]
pub struct CommandMinifier {
    tool: Tool,
}

impl Default for CommandMinifier {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, INSTALL_HINT)
    }
}

impl CommandMinifier {
    /// Use the given executable; `install_hint` is shown when it is missing.
    pub fn new(program: impl Into<PathBuf>, install_hint: impl Into<String>) -> Self {
        Self {
            tool: Tool::new(program, install_hint),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.tool.args.push(arg.into());
        self
    }

    /// The executable that will be run.
    pub fn program(&self) -> &Path {
        &self.tool.program
    }
}

impl Minifier for CommandMinifier {
    fn minify(&self, css: &str) -> Result<String> {
        let output = self.tool.run(&[], Some(css))?;
        if output.success {
            return Ok(output.stdout);
        }

        warn!(
            target = "less_batch::engine",
            program = %self.tool.program.display(),
            exit_code = output.exit_code.unwrap_or(-1),
            stderr = %output.stderr.trim(),
            "Minifier failed"
        );
        Err(Error::Io(std::io::Error::other(format!(
            "{} exited with {}: {}",
            self.tool.program.display(),
            output
                .exit_code
                .map_or_else(|| "signal".to_string(), |code| code.to_string()),
            output.stderr.trim()
        ))))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_minifies_via_stdin() {
        let dir = TempDir::new().unwrap();
        let program = script(dir.path(), "fake-cleancss", "tr -d ' \\n'");

        let minifier = CommandMinifier::new(&program, "n/a");
        let css = minifier.minify("a {\n  color: red;\n}\n").unwrap();
        assert_eq!(css, "a{color:red;}");
    }

    #[test]
    fn test_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let program = script(dir.path(), "broken", "cat >/dev/null; echo bad input >&2; exit 3");

        let err = CommandMinifier::new(&program, "n/a").minify("a{}").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let err = CommandMinifier::new(dir.path().join("yuicompressor"), "install yui")
            .minify("a{}")
            .unwrap_err();
        assert!(err.is_missing_dependency());
        assert!(!err.is_compile());
        assert!(err.to_string().ends_with("Install it with: install yui"));
    }

    #[test]
    fn test_default_program() {
        let minifier = CommandMinifier::default().arg("-O1");
        assert_eq!(minifier.program(), Path::new("cleancss"));
    }
}

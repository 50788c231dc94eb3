//! `lessc` command-line compiler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::command::Tool;
use super::LessCompiler;
use crate::diagnostic::{CompileError, Result};

const DEFAULT_PROGRAM: &str = "lessc";
const INSTALL_HINT: &str = "npm install -g less";

/// Compiles files by running `lessc --no-color <file>`.
#[derive(Debug, Clone)]
pub struct LesscCompiler {
    tool: Tool,
}

impl Default for LesscCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl LesscCompiler {
    /// Use the given `lessc` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let mut tool = Tool::new(program, INSTALL_HINT);
        tool.args.push("--no-color".into());
        Self { tool }
    }

    /// Append an extra argument, e.g. `--include-path=vendor`.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.tool.args.push(arg.into());
        self
    }

    /// The executable that will be run.
    pub fn program(&self) -> &Path {
        &self.tool.program
    }
}

impl LessCompiler for LesscCompiler {
    fn compile_file(&self, path: &Path) -> Result<String> {
        let output = self.tool.run(&[path.as_os_str().to_owned()], None)?;
        if output.success {
            return Ok(output.stdout);
        }

        // lessc reports parse errors on stderr; some versions use stdout.
        let report = if output.stderr.trim().is_empty() {
            &output.stdout
        } else {
            &output.stderr
        };
        let err = CompileError::from_output(path, report);
        warn!(
            target = "less_batch::engine",
            path = %path.display(),
            exit_code = output.exit_code.unwrap_or(-1),
            message = %err.message,
            "lessc failed"
        );
        Err(err.into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_lessc(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-lessc");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_compiles_via_cli() {
        let dir = TempDir::new().unwrap();
        // Echo the arguments so the test can check what was passed.
        let program = fake_lessc(dir.path(), r#"echo "/* $1 */"; cat "$2""#);
        let source = dir.path().join("app.less");
        fs::write(&source, "a { color: red; }").unwrap();

        let css = LesscCompiler::new(&program).compile_file(&source).unwrap();
        assert_eq!(css, "/* --no-color */\na { color: red; }");
    }

    #[test]
    fn test_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let program = fake_lessc(
            dir.path(),
            "echo 'ParseError: Unrecognised input in app.less on line 2, column 4:' >&2\nexit 1",
        );

        let err = LesscCompiler::new(&program)
            .compile_file(Path::new("app.less"))
            .unwrap_err();
        let compile = err.as_compile().unwrap();
        assert_eq!(compile.line, Some(2));
        assert_eq!(compile.column, Some(4));
        assert_eq!(compile.path, Path::new("app.less"));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let err = LesscCompiler::new(dir.path().join("no-such-lessc"))
            .compile_file(Path::new("app.less"))
            .unwrap_err();
        assert!(err.is_missing_dependency());
        assert!(err.to_string().contains("npm install -g less"));
    }

    #[test]
    fn test_extra_args() {
        let compiler = LesscCompiler::default().arg("--strict-math=on");
        assert_eq!(compiler.program(), Path::new("lessc"));
        assert_eq!(compiler.tool.args.len(), 2);
    }
}

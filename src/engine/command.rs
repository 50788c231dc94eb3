//! External process invocation shared by the CLI-backed engines.

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};

use crate::diagnostic::{Error, Result};

/// Captured result of a finished process.
pub(crate) struct Output {
    pub(crate) success: bool,
    pub(crate) exit_code: Option<i32>,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// A program plus fixed leading arguments.
#[derive(Debug, Clone)]
pub(crate) struct Tool {
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<OsString>,
    pub(crate) install_hint: String,
}

impl Tool {
    pub(crate) fn new(program: impl Into<PathBuf>, install_hint: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            install_hint: install_hint.into(),
        }
    }

    /// Run the tool with `extra` appended to its arguments, optionally piping
    /// `stdin`. A missing executable maps to [`Error::MissingDependency`].
    pub(crate) fn run(&self, extra: &[OsString], stdin: Option<&str>) -> Result<Output> {
        let started_at = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                warn!(
                    target = "less_batch::engine",
                    program = %self.program.display(),
                    error = %err,
                    "Failed to spawn external tool"
                );
                if err.kind() == ErrorKind::NotFound {
                    Error::missing_dependency(
                        self.program.display().to_string(),
                        self.install_hint.clone(),
                    )
                } else {
                    Error::Io(err)
                }
            })?;

        // Stdin is written on its own thread: the tool may fill stdout before
        // it has read all of its input.
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_owned();
                Some(thread::spawn(move || pipe.write_all(input.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The tool may exit before consuming its input; its status says why.
                Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => return Err(Error::Io(err)),
                Err(_) => {
                    return Err(Error::Io(std::io::Error::other(
                        "stdin writer thread panicked",
                    )));
                }
            }
        }

        let result = Output {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            target = "less_batch::engine",
            program = %self.program.display(),
            exit_code = result.exit_code.unwrap_or(-1),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            stdout_bytes = result.stdout.len(),
            "External tool finished"
        );
        Ok(result)
    }
}

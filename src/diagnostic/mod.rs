//! Error types for configuration, compilation and tooling failures.

mod error;

pub use error::{CompileError, ConfigError, Error, Result};

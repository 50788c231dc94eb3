//! # less-batch
//!
//! Resolve, compile and cache LESS stylesheets for web applications.
//!
//! Given a stylesheet identifier, the crate finds its source file (or the
//! members of a named *combination*), compiles them to CSS with an external
//! compiler, optionally compresses the result, and writes it once to a cache
//! directory so a static file server can take over:
//!
//! - **Resolution**: `name.less` preferred over `name.css`; a direct source
//!   always wins over a combination of the same name
//! - **Combinations**: named, ordered source lists served as one resource
//! - **Write-once cache**: `<cache>/<identifier>.css`, never rewritten
//! - **References**: cache-busted filenames for `<link>` tags
//!
//! ## Quick Start
//!
//! ```ignore
//! use less_batch::{CacheBust, ConfigBuilder, Stylesheets};
//!
//! let config = ConfigBuilder::new()
//!     .cache_dir("public/stylesheets")
//!     .combination("web", ["reset", "common", "app_web"])
//!     .cache_bust(CacheBust::Timestamp)
//!     .build()?;
//! let stylesheets = Stylesheets::new(config, "app/stylesheets")?;
//!
//! // In a template: one <link> per filename.
//! for href in stylesheets.reference("web") {
//!     println!(r#"<link rel="stylesheet" href="/stylesheets/{href}">"#);
//! }
//!
//! // In a request handler.
//! let css = stylesheets.compile("web")?;
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Settings and stylesheet references
//! - [`source`]: Per-request resolution and compilation
//! - [`engine`]: Compiler and minifier seams (`lessc`, `cleancss`)
//! - [`cache`]: Write-once artifact store
//! - [`resolve`]: Source file lookup
//! - [`diagnostic`]: Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "batch")]
pub mod batch;
pub mod cache;
pub mod compile;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod resolve;
pub mod source;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use less_batch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CacheBust, Compression, Config, ConfigBuilder, Error, Response, Source, Stylesheets,
        StylesheetRef, Toolchain,
    };

    #[cfg(feature = "batch")]
    pub use crate::Batcher;
}

// =============================================================================
// High-Level API
// =============================================================================

pub use compile::{Response, Stylesheets, CSS_CONTENT_TYPE};
pub use source::Source;

#[cfg(feature = "batch")]
pub use batch::{BatchResult, Batcher};

// =============================================================================
// Configuration
// =============================================================================

pub use config::{CacheBust, Compression, Config, ConfigBuilder, StylesheetRef};

// =============================================================================
// Infrastructure
// =============================================================================

pub use cache::CacheDir;
pub use diagnostic::{CompileError, ConfigError, Error, Result};
pub use engine::{compress, CommandMinifier, LessCompiler, LesscCompiler, Minifier, Toolchain};
pub use resolve::{resolve_source, resolve_sources, PREFERRED_EXTENSIONS};

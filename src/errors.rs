//! inline-snap error types.
//!
//! Two families live here:
//! - [`MarkerMisuse`]: the test author placed `<snap:ignore>` where it cannot be anchored.
//!   This is a programmer error and [`crate::matcher::matches`] panics with it.
//! - [`RewriteError`]: anything that stops a literal from being written back to source.
//!   These are reported to the test context and never abort the test process.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// MATCHER MISUSE
// ============================================================================

/// An ignore marker that cannot be anchored to fixed text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum MarkerMisuse {
    #[error("\"<snap:ignore>\" is not allowed as a prefix of a snapshot")]
    #[diagnostic(
        code(snap::marker::prefix),
        help("put fixed text before the marker so leading data cannot slip through")
    )]
    Prefix,

    #[error("\"<snap:ignore>\" is not allowed as a suffix of a snapshot")]
    #[diagnostic(
        code(snap::marker::suffix),
        help("put fixed text after the marker so trailing data cannot slip through")
    )]
    Suffix,

    #[error("\"<snap:ignore>\" must be followed by fixed text before the next marker")]
    #[diagnostic(
        code(snap::marker::adjacent),
        help("merge adjacent markers into one, or separate them with fixed text")
    )]
    Adjacent,
}

// ============================================================================
// REWRITE FAILURES
// ============================================================================

/// Why a snapshot literal could not be rewritten.
///
/// Every variant except [`RewriteError::Write`] is raised before the source file is touched.
#[derive(Debug, Error, Diagnostic)]
pub enum RewriteError {
    #[error("failed to read source file {path:?}")]
    #[diagnostic(code(snap::rewrite::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path:?}: {message}")]
    #[diagnostic(
        code(snap::rewrite::parse),
        help("the file must be valid Rust before a snapshot can be updated")
    )]
    Parse { path: PathBuf, message: String },

    #[error("no `{callee}(..)` call starts on line {line} of {path:?}")]
    #[diagnostic(
        code(snap::rewrite::call_site),
        help("the call site moved since the test binary was built; rebuild and rerun")
    )]
    CallSiteNotFound {
        path: PathBuf,
        line: u32,
        callee: &'static str,
    },

    #[error("the second argument of the call on line {line} of {path:?} is not a string literal (found `{found}`)")]
    #[diagnostic(
        code(snap::rewrite::literal),
        help("only plain or raw string literals can be rewritten in place")
    )]
    LiteralNotFound {
        path: PathBuf,
        line: u32,
        found: String,
    },

    #[error("refusing to write {path:?}: {message}")]
    #[diagnostic(code(snap::rewrite::serialize))]
    Serialize { path: PathBuf, message: String },

    #[error("failed to write source file {path:?}")]
    #[diagnostic(code(snap::rewrite::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RewriteError {
    /// Short stable name for the failure, used in reports and tests.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::CallSiteNotFound { .. } => "call_site_not_found",
            Self::LiteralNotFound { .. } => "literal_not_found",
            Self::Serialize { .. } => "serialize",
            Self::Write { .. } => "write",
        }
    }

    /// Whether the file on disk may have been modified.
    pub const fn touched_file(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

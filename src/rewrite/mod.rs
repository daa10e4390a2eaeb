//! # Literal Rewriter
//!
//! Replaces the expected-value literal of a `snap(..)` call in a Rust source file.
//!
//! The pipeline is parse → locate → splice → verify → write:
//! 1. The file is parsed into a tree-sitter CST. Nothing is pretty-printed; the new literal is
//!    spliced in by byte range, so comments and formatting survive untouched.
//! 2. The call is found structurally on its captured line (see [`locate`]).
//! 3. The replacement is rendered in the literal's original style (see [`literal`]).
//! 4. The spliced buffer is re-parsed and the literal decoded again. Only a buffer that
//!    round-trips to the replacement text is written, through a temporary file that is
//!    renamed over the original.

pub mod ledger;
pub mod literal;
pub mod locate;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::errors::RewriteError;
use locate::LocateError;

/// What a successful rewrite did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The literal changed and the file was written.
    Updated,
    /// The literal already spelled the replacement; the file was left alone.
    Unchanged,
}

/// Rewrite the literal of the `snap(..)` call at `line`/`column` of `path` to `replacement`.
///
/// `line` is the line as compiled into the running test binary; earlier rewrites in the same
/// file during this process are accounted for.
pub fn rewrite(
    path: &Path,
    line: u32,
    column: u32,
    replacement: &str,
) -> Result<RewriteOutcome, RewriteError> {
    ledger::with_ledger(|ledger| -> Result<RewriteOutcome, RewriteError> {
        let current = ledger.current_line(path, line);
        let source = read_source(path)?;
        let tree = locate::parse(&source).map_err(|message| RewriteError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        let site = locate::find_literal(&tree, &source, current, column)
            .map_err(|e| locate_error(e, path, current))?;
        debug!(
            "snap: located literal at {}:{} bytes {:?}",
            path.display(),
            current,
            site.range
        );

        let old = &source[site.range.clone()];
        let rendered = literal::render(site.style, replacement);
        if rendered == old {
            return Ok(RewriteOutcome::Unchanged);
        }

        let mut buffer = String::with_capacity(source.len() + rendered.len());
        buffer.push_str(&source[..site.range.start]);
        buffer.push_str(&rendered);
        buffer.push_str(&source[site.range.end..]);

        verify(&buffer, current, column, replacement).map_err(|message| {
            RewriteError::Serialize {
                path: path.to_path_buf(),
                message,
            }
        })?;
        write_atomically(path, &buffer)?;

        ledger.record(path, line, line_count(&rendered) - line_count(old));
        debug!("snap: wrote {} bytes to {}", buffer.len(), path.display());
        Ok(RewriteOutcome::Updated)
    })
}

/// Decode the literal of the `snap(..)` call currently at `line`/`column` of `path`.
pub fn read_literal(path: &Path, line: u32, column: u32) -> Result<String, RewriteError> {
    let source = read_source(path)?;
    let tree = locate::parse(&source).map_err(|message| RewriteError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    let site = locate::find_literal(&tree, &source, line, column)
        .map_err(|e| locate_error(e, path, line))?;
    let text = &source[site.range];
    literal::decode(text).ok_or_else(|| RewriteError::LiteralNotFound {
        path: path.to_path_buf(),
        line,
        found: text.to_string(),
    })
}

fn read_source(path: &Path) -> Result<String, RewriteError> {
    fs::read_to_string(path).map_err(|source| RewriteError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn locate_error(error: LocateError, path: &Path, line: u32) -> RewriteError {
    match error {
        LocateError::CallSiteNotFound => RewriteError::CallSiteNotFound {
            path: path.to_path_buf(),
            line,
            callee: locate::CALLEE,
        },
        LocateError::NotAStringLiteral { found } => RewriteError::LiteralNotFound {
            path: path.to_path_buf(),
            line,
            found,
        },
    }
}

/// Check that the spliced buffer still parses and carries `replacement` at the call site.
fn verify(buffer: &str, line: u32, column: u32, replacement: &str) -> Result<(), String> {
    let tree =
        locate::parse(buffer).map_err(|e| format!("rewritten source does not parse: {e}"))?;
    let site = locate::find_literal(&tree, buffer, line, column)
        .map_err(|e| format!("rewritten literal cannot be located: {e:?}"))?;
    let decoded = literal::decode(&buffer[site.range])
        .ok_or_else(|| "rewritten literal cannot be decoded".to_string())?;
    if decoded != replacement {
        return Err("rewritten literal does not decode to the new value".to_string());
    }
    Ok(())
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), RewriteError> {
    let write_error = |source: io::Error| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map_err(write_error)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(contents.as_bytes()).map_err(write_error)?;
    tmp.as_file().set_permissions(permissions).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn line_count(text: &str) -> i64 {
    text.matches('\n').count() as i64
}

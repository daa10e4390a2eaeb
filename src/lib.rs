//! # inline-snap
//!
//! Snapshot assertions that live inline in test source and update themselves.
//!
//! ```
//! use inline_snap::{snap, Snapshot, TestContext};
//!
//! let t = TestContext::new("addition");
//! let check_addition = |x: i32, y: i32, want: Snapshot| {
//!     want.diff(&(x + y).to_string());
//! };
//! check_addition(2, 2, snap(&t, "4"));
//! ```
//!
//! When the snapshot differs, the failure shows a `-want +got` diff. Rerun the tests with the
//! `SNAP_UPDATE` environment variable set (any value) and the string literal passed to
//! [`snap`] is rewritten in place to the actual value. [`Snapshot::update`] does the same
//! for a single snapshot.
//!
//! Values that change between runs can be masked with [`IGNORE_MARKER`]:
//!
//! ```
//! use inline_snap::{snap, TestContext};
//!
//! let t = TestContext::new("clock");
//! let millis = std::time::SystemTime::now()
//!     .duration_since(std::time::UNIX_EPOCH)
//!     .unwrap()
//!     .as_millis();
//! snap(&t, "Unix time is <snap:ignore> ms").diff(&format!("Unix time is {millis} ms"));
//! ```
//!
//! An ignored span must be non-empty and on one line, and the marker may not start or end
//! the snapshot. Markers survive updates on multi-line snapshots (see [`merge`]).
//!
//! ## Module map
//! - [`matcher`]: marker-aware comparison
//! - [`location`]: call-site capture
//! - [`rewrite`]: locating and replacing the literal in source
//! - [`merge`]: carrying markers over into updated literals
//! - [`session`]: the [`Snapshot`] state machine
//! - [`context`]: the [`Reporter`] surface and [`TestContext`]

pub mod config;
pub mod context;
pub mod errors;
pub mod location;
pub mod matcher;
pub mod merge;
pub mod output;
pub mod rewrite;
pub mod session;

pub use config::Config;
pub use context::{Reporter, TestContext};
pub use errors::{MarkerMisuse, RewriteError};
pub use location::SourceLocation;
pub use matcher::{matches, try_matches};
pub use rewrite::RewriteOutcome;
pub use session::{snap, Outcome, Snapshot};

/// Marks a span of an expected value that may differ between runs.
pub const IGNORE_MARKER: &str = "<snap:ignore>";

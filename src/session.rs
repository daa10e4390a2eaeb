//! # Snapshot Session
//!
//! [`snap`] binds a reporter, the caller's source location and an expected literal. The
//! comparison entry points ([`Snapshot::diff`], [`Snapshot::diff_json`],
//! [`Snapshot::diff_debug`]) walk one small state machine:
//!
//! - match: nothing happens;
//! - mismatch, update disabled: the diff is reported and a hint on enabling updates is logged;
//! - mismatch, update enabled: the diff is reported, then the literal in source is rewritten
//!   with the actual value (markers merged back in, as long as the merged literal still
//!   matches the actual value). A failed rewrite is reported as a separate failure.

use std::error::Error as _;
use std::fmt;

use log::debug;
use miette::Diagnostic;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::{Config, UPDATE_ENV};
use crate::context::Reporter;
use crate::errors::RewriteError;
use crate::location::SourceLocation;
use crate::matcher::{matches, try_matches};
use crate::merge::merge;
use crate::output::render_diff;
use crate::rewrite::{self, RewriteOutcome};

/// Result of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The actual value matched the snapshot.
    Matched,
    /// The snapshot differs and was not rewritten.
    Mismatched,
    /// The snapshot differs and its literal was rewritten in source.
    Updated,
    /// The value could not be compared, or the rewrite failed.
    Failed,
}

/// An inline snapshot assertion.
pub struct Snapshot<'r> {
    location: SourceLocation,
    location_found: bool,
    text: String,
    update_requested: bool,
    config: Config,
    reporter: &'r dyn Reporter,
}

/// Create a snapshot expecting `text`, capturing the caller's location.
///
/// The literal passed as `text` is what gets rewritten on update, so it must be written
/// inline as the second argument: `snap(&t, "expected")`.
///
/// ```
/// use inline_snap::{snap, TestContext};
///
/// let t = TestContext::new("addition");
/// snap(&t, "4").diff(&(2 + 2).to_string());
/// ```
#[track_caller]
pub fn snap<'r>(reporter: &'r dyn Reporter, text: &str) -> Snapshot<'r> {
    let (location, found) = SourceLocation::capture();
    Snapshot::at(reporter, location, found, text)
}

impl<'r> Snapshot<'r> {
    /// Create a snapshot for an explicit location, using [`Config::global`].
    pub fn at(
        reporter: &'r dyn Reporter,
        location: SourceLocation,
        location_found: bool,
        text: &str,
    ) -> Self {
        if !location_found {
            reporter.log(&format!(
                "snap: unable to resolve caller location {location}; this snapshot will not be updated"
            ));
        }
        Self {
            location,
            location_found,
            text: text.to_string(),
            update_requested: false,
            config: Config::global(),
            reporter,
        }
    }

    /// Replace the process-wide configuration for this snapshot.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Update this snapshot in place on mismatch, regardless of `SNAP_UPDATE`.
    pub fn update(self) -> Self {
        Self {
            update_requested: true,
            ..self
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a mismatch would rewrite the source. Never true for an unresolved location.
    pub fn should_update(&self) -> bool {
        self.location_found && (self.update_requested || self.config.update)
    }

    /// Compare the snapshot with `actual`.
    ///
    /// # Panics
    /// Panics if the snapshot misuses the ignore marker (see [`crate::matcher::matches`]).
    #[track_caller]
    pub fn diff(&self, actual: &str) -> Outcome {
        if matches(actual, &self.text) {
            return Outcome::Matched;
        }

        self.reporter.report_failure(&format!(
            "{}: snap: Snapshot differs: (-want +got):\n{}",
            self.location,
            render_diff(&self.text, actual, self.config.color)
        ));

        if !self.should_update() {
            self.reporter.log(&format!(
                "{}: snap: Rerun with {UPDATE_ENV}=1 environment variable to update the snapshot.",
                self.location
            ));
            return Outcome::Mismatched;
        }

        self.update_source(actual)
    }

    /// Compare the snapshot with the JSON serialization of `value`.
    ///
    /// `indent` is repeated per nesting level; an empty indent produces compact JSON. The
    /// output carries no trailing newline.
    #[track_caller]
    pub fn diff_json<T: Serialize + ?Sized>(&self, value: &T, indent: &str) -> Outcome {
        match to_json(value, indent) {
            Ok(json) => self.diff(&json),
            Err(e) => {
                self.reporter
                    .report_failure(&format!("{}: snap: {e}", self.location));
                Outcome::Failed
            }
        }
    }

    /// Compare the snapshot with the pretty `Debug` rendering of `value`.
    #[track_caller]
    pub fn diff_debug<T: fmt::Debug + ?Sized>(&self, value: &T) -> Outcome {
        self.diff(&format!("{value:#?}"))
    }

    fn update_source(&self, actual: &str) -> Outcome {
        let merged = merge(actual, &self.text);
        // The rewritten literal must match the value it came from, or the next run fails again.
        let replacement = if try_matches(actual, &merged).unwrap_or(false) {
            merged
        } else {
            self.reporter.log(&format!(
                "{}: snap: ignore markers could not be carried over; writing the actual value",
                self.location
            ));
            actual.to_string()
        };
        debug!("snap: rewriting {} with {} bytes", self.location, replacement.len());

        match rewrite::rewrite(
            &self.location.file,
            self.location.line,
            self.location.column,
            &replacement,
        ) {
            Ok(RewriteOutcome::Updated) => {
                self.reporter
                    .log(&format!("snap: Updated {}", self.location.file.display()));
                Outcome::Updated
            }
            Ok(RewriteOutcome::Unchanged) => {
                self.reporter.log(&format!(
                    "{}: snap: literal already holds the merged value; nothing to update",
                    self.location
                ));
                Outcome::Mismatched
            }
            Err(e) => {
                self.reporter
                    .report_failure(&format!("{}: snap: {}", self.location, describe(&e)));
                Outcome::Failed
            }
        }
    }
}

impl fmt::Debug for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("location", &self.location)
            .field("location_found", &self.location_found)
            .field("text", &self.text)
            .field("update_requested", &self.update_requested)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, indent: &str) -> serde_json::Result<String> {
    if indent.is_empty() {
        return serde_json::to_string(value);
    }
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// One-paragraph rendering of a rewrite error: message, cause and help.
fn describe(error: &RewriteError) -> String {
    let mut message = error.to_string();
    if let Some(source) = error.source() {
        message.push_str(&format!(": {source}"));
    }
    if let Some(help) = error.help() {
        message.push_str(&format!("\nhelp: {help}"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Serialize)]
    struct Person {
        name: &'static str,
        age: u32,
    }

    fn scratch(source: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_case.rs");
        fs::write(&path, source).unwrap();
        (dir, path)
    }

    fn located<'r>(t: &'r TestContext, path: &Path, line: u32, text: &str) -> Snapshot<'r> {
        let (location, found) = SourceLocation::resolve(path, line, 5);
        Snapshot::at(t, location, found, text).with_config(Config::default())
    }

    #[test]
    fn match_reports_nothing() {
        let t = TestContext::quiet("match");
        let outcome = snap(&t, "4").with_config(Config::default()).diff("4");
        assert_eq!(outcome, Outcome::Matched);
        assert!(!t.failed());
        assert!(t.logs().is_empty());
    }

    #[test]
    fn mismatch_without_update_reports_and_hints() {
        let t = TestContext::quiet("mismatch");
        let outcome = snap(&t, "8").with_config(Config::default()).diff("4");
        assert_eq!(outcome, Outcome::Mismatched);

        let failures = t.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("snap: Snapshot differs: (-want +got):\n-8\n+4\n"));
        assert!(failures[0].contains("src/session.rs:"));
        assert!(t.logs()[0].contains("Rerun with SNAP_UPDATE=1"));
    }

    #[test]
    fn explicit_update_rewrites_the_literal() {
        let (_dir, path) = scratch("fn t() {\n    snap(&t, \"8\");\n}\n");
        let t = TestContext::quiet("update");

        let outcome = located(&t, &path, 2, "8").update().diff("4");
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn t() {\n    snap(&t, \"4\");\n}\n"
        );
        assert_eq!(t.take_failures().len(), 1);
        assert!(t.logs()[0].starts_with("snap: Updated "));

        // Comparing again against the rewritten literal is a clean match.
        let reread = rewrite::read_literal(&path, 2, 5).unwrap();
        let again = located(&t, &path, 2, &reread).update().diff("4");
        assert_eq!(again, Outcome::Matched);
        assert!(!t.failed());
    }

    #[test]
    fn config_update_enables_rewrites() {
        let (_dir, path) = scratch("fn t() {\n    snap(&t, \"8\");\n}\n");
        let t = TestContext::quiet("config");

        let snapshot = located(&t, &path, 2, "8").with_config(Config::default().with_update(true));
        assert!(snapshot.should_update());
        assert_eq!(snapshot.diff("4"), Outcome::Updated);
        t.take_failures();
    }

    #[test]
    fn unresolved_location_never_updates() {
        let t = TestContext::quiet("unresolved");
        let (location, found) = SourceLocation::resolve("does/not/exist.rs", 3, 1);
        let snapshot = Snapshot::at(&t, location, found, "8")
            .with_config(Config::default().with_update(true))
            .update();

        assert!(!snapshot.should_update());
        assert_eq!(snapshot.diff("4"), Outcome::Mismatched);
        assert!(t.logs()[0].contains("unable to resolve caller location"));
        t.take_failures();
    }

    #[test]
    fn rewrite_failure_is_a_second_failure() {
        let (_dir, path) = scratch("fn t() {\n    snap(&t, EXPECTED);\n}\n");
        let t = TestContext::quiet("rewrite-failure");

        assert_eq!(located(&t, &path, 2, "8").update().diff("4"), Outcome::Failed);
        let failures = t.take_failures();
        assert_eq!(failures.len(), 2);
        assert!(failures[1].contains("is not a string literal"));
        assert!(failures[1].contains("help: only plain or raw string literals"));
    }

    #[test]
    fn update_preserves_ignore_markers() {
        let source = "fn t() {\n    snap(&t, r#\"{\n  \"name\": \"John\",\n  \"timestamp\": \"<snap:ignore>\"\n}\"#);\n}\n";
        let (_dir, path) = scratch(source);
        let t = TestContext::quiet("markers");
        let old = "{\n  \"name\": \"John\",\n  \"timestamp\": \"<snap:ignore>\"\n}";
        let actual = "{\n  \"name\": \"Jane\",\n  \"timestamp\": \"2024-05-18T02:40:00Z\"\n}";

        assert_eq!(located(&t, &path, 2, old).update().diff(actual), Outcome::Updated);
        let merged = rewrite::read_literal(&path, 2, 5).unwrap();
        assert_eq!(
            merged,
            "{\n  \"name\": \"Jane\",\n  \"timestamp\": \"<snap:ignore>\"\n}"
        );
        t.take_failures();

        // The merged literal matches the same actual value.
        assert_eq!(located(&t, &path, 2, &merged).diff(actual), Outcome::Matched);
    }

    #[test]
    fn update_with_added_field_stays_idempotent() {
        let source = "fn t() {\n    snap(&t, r#\"{\n  \"name\": \"John\",\n  \"timestamp\": \"<snap:ignore>\"\n}\"#);\n}\n";
        let (_dir, path) = scratch(source);
        let t = TestContext::quiet("added-field");
        let old = "{\n  \"name\": \"John\",\n  \"timestamp\": \"<snap:ignore>\"\n}";
        let actual = "{\n  \"name\": \"Jane\",\n  \"timestamp\": \"2024-05-18\",\n  \"age\": 25\n}";

        assert_eq!(located(&t, &path, 2, old).update().diff(actual), Outcome::Updated);
        let merged = rewrite::read_literal(&path, 2, 5).unwrap();
        assert_eq!(
            merged,
            "{\n  \"name\": \"Jane\",\n  \"timestamp\": \"<snap:ignore>\",\n  \"age\": 25\n}"
        );
        t.take_failures();

        assert_eq!(located(&t, &path, 2, &merged).diff(actual), Outcome::Matched);
    }

    #[test]
    fn unmergeable_markers_fall_back_to_the_actual_value() {
        let (_dir, path) = scratch("fn t() {\n    snap(&t, \"{\\\"id\\\":\\\"<snap:ignore>\\\"}\");\n}\n");
        let t = TestContext::quiet("fallback");
        let old = r#"{"id":"<snap:ignore>"}"#;
        let actual = r#"{"id":7,"ok":true}"#;

        assert_eq!(located(&t, &path, 2, old).update().diff(actual), Outcome::Updated);
        assert_eq!(rewrite::read_literal(&path, 2, 5).unwrap(), actual);
        assert!(t.logs().iter().any(|l| l.contains("could not be carried over")));
        t.take_failures();

        assert_eq!(located(&t, &path, 2, actual).diff(actual), Outcome::Matched);
    }

    #[test]
    fn json_snapshots_use_the_given_indent() {
        let t = TestContext::quiet("json");
        let doug = Person { name: "Doug", age: 20 };

        let outcome = snap(&t, "{\n  \"name\": \"Doug\",\n  \"age\": 20\n}")
            .with_config(Config::default())
            .diff_json(&doug, "  ");
        assert_eq!(outcome, Outcome::Matched);

        let compact = snap(&t, r#"{"name":"Doug","age":20}"#)
            .with_config(Config::default())
            .diff_json(&doug, "");
        assert_eq!(compact, Outcome::Matched);
    }

    #[test]
    fn debug_snapshots() {
        let t = TestContext::quiet("debug");
        let outcome = snap(&t, "[\n    1,\n    2,\n]")
            .with_config(Config::default())
            .diff_debug(&[1, 2]);
        assert_eq!(outcome, Outcome::Matched);
    }

    #[test]
    #[should_panic(expected = "not allowed as a suffix")]
    fn marker_misuse_aborts_the_comparison() {
        let t = TestContext::quiet("misuse");
        snap(&t, "12<snap:ignore>")
            .with_config(Config::default())
            .diff("123");
    }
}

//! The reporting surface a snapshot needs from its test.
//!
//! Snapshots only ever call [`Reporter::report_failure`] and [`Reporter::log`]. Rust's test
//! harness has no per-test handle, so [`TestContext`] plays that role: it echoes everything to
//! stderr (captured per test by libtest), remembers failures, and fails the test once it is
//! dropped or [`finish`](TestContext::finish)ed.

use std::cell::RefCell;
use std::fmt;

/// Sink for snapshot failures and informational messages.
pub trait Reporter {
    /// Mark the test as failed with `message`. Must not abort the caller.
    fn report_failure(&self, message: &str);

    /// Record an informational message.
    fn log(&self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report_failure(&self, message: &str) {
        (**self).report_failure(message)
    }

    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

/// A named test scope that collects snapshot failures.
///
/// ```should_panic
/// use inline_snap::{snap, TestContext};
///
/// let t = TestContext::new("addition");
/// snap(&t, "8").diff(&(2 + 2).to_string());
/// t.finish(); // panics: the snapshot differs
/// ```
pub struct TestContext {
    name: String,
    failures: RefCell<Vec<String>>,
    logs: RefCell<Vec<String>>,
    echo: bool,
}

impl TestContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: RefCell::new(Vec::new()),
            logs: RefCell::new(Vec::new()),
            echo: true,
        }
    }

    /// A context that records without echoing to stderr.
    pub fn quiet(name: impl Into<String>) -> Self {
        let mut context = Self::new(name);
        context.echo = false;
        context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failed(&self) -> bool {
        !self.failures.borrow().is_empty()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.borrow().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.borrow().clone()
    }

    /// Drain recorded failures, leaving the context passing.
    pub fn take_failures(&self) -> Vec<String> {
        self.failures.take()
    }

    /// Consume the context, panicking if any failure was reported.
    #[track_caller]
    pub fn finish(self) {
        let failures = self.failures.take();
        if !failures.is_empty() {
            panic!("{}", FailureSummary { name: &self.name, failures: &failures });
        }
    }
}

impl Reporter for TestContext {
    fn report_failure(&self, message: &str) {
        if self.echo {
            eprintln!("{}: {}", self.name, message);
        }
        self.failures.borrow_mut().push(message.to_string());
    }

    fn log(&self, message: &str) {
        if self.echo {
            eprintln!("{}: {}", self.name, message);
        }
        self.logs.borrow_mut().push(message.to_string());
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("name", &self.name)
            .field("failures", &self.failures.borrow().len())
            .field("logs", &self.logs.borrow().len())
            .finish()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let failures = self.failures.take();
        // A second panic while unwinding would abort the whole test binary.
        if !failures.is_empty() && !std::thread::panicking() {
            panic!("{}", FailureSummary { name: &self.name, failures: &failures });
        }
    }
}

struct FailureSummary<'a> {
    name: &'a str,
    failures: &'a [String],
}

impl fmt::Display for FailureSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} snapshot failure(s) in {}:",
            self.failures.len(),
            self.name
        )?;
        for failure in self.failures {
            writeln!(f, "{failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_failures_and_logs() {
        let t = TestContext::quiet("records");
        t.log("hello");
        t.report_failure("boom");
        assert!(t.failed());
        assert_eq!(t.logs(), vec!["hello".to_string()]);
        assert_eq!(t.take_failures(), vec!["boom".to_string()]);
        assert!(!t.failed());
    }

    #[test]
    fn quiet_keeps_the_name_and_stops_echoing() {
        let quiet = TestContext::quiet("silent");
        assert_eq!(quiet.name(), "silent");
        assert!(!quiet.echo);
        assert!(TestContext::new("loud").echo);
    }

    #[test]
    #[should_panic(expected = "1 snapshot failure(s) in dropped")]
    fn drop_with_failures_panics() {
        let t = TestContext::quiet("dropped");
        t.report_failure("boom");
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn finish_with_failures_panics() {
        let t = TestContext::quiet("finished");
        t.report_failure("boom");
        t.finish();
    }

    #[test]
    fn finish_without_failures_passes() {
        let t = TestContext::quiet("clean");
        t.log("only a log");
        t.finish();
    }

    #[test]
    fn reporter_is_usable_through_references() {
        let t = TestContext::quiet("by-ref");
        let by_ref: &dyn Reporter = &t;
        (&by_ref).log("nested");
        assert_eq!(t.logs().len(), 1);
    }
}

//! Failure sinks: where assertion failures and warnings go.
//!
//! A [`Transport`](crate::Transport) without a sink runs in mock-only mode:
//! testers are skipped and unmatched requests quietly get a 404.

use parking_lot::Mutex;
use tracing::{error, warn};

/// Receives test failures and warnings raised during dispatch.
pub trait FailureSink: Send + Sync {
    /// Record a test failure. Dispatch continues afterwards.
    fn fail(&self, message: &str);

    /// Log a non-fatal diagnostic.
    fn warn(&self, message: &str);
}

/// Sink for tests: records failures and panics on drop if any were recorded.
///
/// Share it with the transport through an `Arc` and keep a handle to inspect
/// failures with [`failures`](Self::failures). Draining them with
/// [`take_failures`](Self::take_failures) disarms the drop check, which is how
/// tests that expect failures assert on them.
#[derive(Debug, Default)]
pub struct TestReporter {
    name: Option<String>,
    failures: Mutex<Vec<String>>,
}

impl TestReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter whose failures are labelled with the test name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Remove and return the recorded failures.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *self.failures.lock())
    }

    pub fn has_failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }
}

impl FailureSink for TestReporter {
    fn fail(&self, message: &str) {
        error!(test = self.name.as_deref().unwrap_or(""), "{message}");
        self.failures.lock().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        warn!(test = self.name.as_deref().unwrap_or(""), "{message}");
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let failures = std::mem::take(self.failures.get_mut());
        if failures.is_empty() {
            return;
        }
        let label = self.name.as_deref().unwrap_or("transport");
        panic!(
            "{label}: {} assertion(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

/// Sink that only logs. Failures become `error!` events and never panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FailureSink for LogSink {
    fn fail(&self, message: &str) {
        error!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}

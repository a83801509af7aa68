//! Progress reporting seam between the flows and the terminal

use crate::error::Result;
use std::future::Future;

/// Receives human-readable progress from a flow
pub trait Reporter {
    fn intro(&self, _title: &str) {}
    fn step_started(&self, message: &str);
    fn step_finished(&self, message: &str);
    fn step_failed(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn success(&self, message: &str);
    fn outro(&self, _message: &str) {}
}

/// Drops progress on the floor; diagnostics still go to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn step_started(&self, message: &str) {
        tracing::debug!(message, "step started");
    }
    fn step_finished(&self, message: &str) {
        tracing::debug!(message, "step finished");
    }
    fn step_failed(&self, message: &str) {
        tracing::debug!(message, "step failed");
    }
    fn info(&self, message: &str) {
        tracing::debug!(message, "info");
    }
    fn warning(&self, message: &str) {
        tracing::warn!(message);
    }
    fn success(&self, message: &str) {
        tracing::debug!(message, "success");
    }
}

/// Run `work` between a started and a finished/failed step notification
pub async fn track<P, T, F>(reporter: &P, started: &str, finished: &str, work: F) -> Result<T>
where
    P: Reporter + ?Sized,
    F: Future<Output = Result<T>>,
{
    reporter.step_started(started);
    match work.await {
        Ok(value) => {
            reporter.step_finished(finished);
            Ok(value)
        }
        Err(e) => {
            reporter.step_failed(started);
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every message, prefixed with its kind
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn has(&self, prefix: &str, needle: &str) -> bool {
            self.lines()
                .iter()
                .any(|l| l.starts_with(prefix) && l.contains(needle))
        }

        fn push(&self, kind: &str, message: &str) {
            self.lines.lock().unwrap().push(format!("{kind}: {message}"));
        }
    }

    impl Reporter for RecordingReporter {
        fn step_started(&self, message: &str) {
            self.push("start", message);
        }
        fn step_finished(&self, message: &str) {
            self.push("done", message);
        }
        fn step_failed(&self, message: &str) {
            self.push("failed", message);
        }
        fn info(&self, message: &str) {
            self.push("info", message);
        }
        fn warning(&self, message: &str) {
            self.push("warning", message);
        }
        fn success(&self, message: &str) {
            self.push("success", message);
        }
    }
}

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

/// One failure reported by a driver component.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub submitter: String,
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

/// Shared sink for cross-thread failure text.
///
/// Explicitly constructed and passed by `Arc`; the executor's workers and the
/// generators use it to surface failures that would otherwise be swallowed
/// inside worker threads.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    reports: Mutex<Vec<ErrorReport>>,
    error_encountered: AtomicBool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure. Reporting itself never fails; a poisoned lock
    /// still holds the accumulated reports.
    pub fn report_error(&self, submitter: &str, description: impl Into<String>) {
        let report = ErrorReport {
            submitter: submitter.to_string(),
            description: description.into(),
            reported_at: Utc::now(),
        };
        self.lock().push(report);
        self.error_encountered.store(true, Ordering::SeqCst);
    }

    /// Whether any component has reported a failure so far.
    pub fn error_encountered(&self) -> bool {
        self.error_encountered.load(Ordering::SeqCst)
    }

    /// Snapshot of all reports accumulated so far.
    pub fn error_reports(&self) -> Vec<ErrorReport> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ErrorReport>> {
        match self.reports.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reports = self.error_reports();
        if reports.is_empty() {
            return writeln!(f, "no errors reported");
        }
        writeln!(f, "{} error(s) reported:", reports.len())?;
        for report in reports {
            writeln!(
                f,
                "[{} @ {}] {}",
                report.submitter,
                report.reported_at.to_rfc3339(),
                report.description
            )?;
        }
        Ok(())
    }
}

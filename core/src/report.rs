//! Per-item outcome aggregation for batches whose failures are isolated.

use core::fmt;

/// One isolated failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    subject: String,
    message: String,
}

impl Failure {
    /// Records that `subject` failed with `message`.
    pub fn new(subject: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            subject: subject.into(),
            message: message.to_string(),
        }
    }

    /// What failed: an attribute name, a listener id or a binding description.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Why it failed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Outcome of a batch of independent operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    succeeded: usize,
    skipped: usize,
    failures: Vec<Failure>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one completed operation.
    pub const fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Counts one operation that had nothing to do.
    pub const fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Records one failed operation.
    pub fn record_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Operations that completed.
    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Operations that had nothing to do.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Operations that failed, in the order they ran.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Total number of operations attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failures.len()
    }

    /// Whether no operation failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Adds the counts and failures of `other` to this report.
    pub fn merge(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates() {
        let mut first = Report::new();
        first.record_success();
        first.record_failure(Failure::new("title", "boom"));

        let mut second = Report::new();
        second.record_skip();
        second.record_success();

        first.merge(second);
        assert_eq!(first.succeeded(), 2);
        assert_eq!(first.skipped(), 1);
        assert_eq!(first.total(), 4);
        assert!(!first.is_clean());
        assert_eq!(first.failures()[0].to_string(), "title: boom");
    }
}

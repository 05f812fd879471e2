//! Batch result types.

use std::time::Duration;

/// Outcome of a completed batch.
///
/// Produced by [`BatchRunner::finish`](super::BatchRunner::finish) after
/// the drain, so every submitted job has been accounted for.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Jobs accepted for execution.
    pub submitted: usize,
    /// Jobs that completed without error.
    pub succeeded: usize,
    /// Jobs that reported an error.
    pub failed: usize,
    /// One formatted message per failure, in completion order.
    pub errors: Vec<String>,
    /// Message of the single retained batch error, if any job failed.
    pub first_error: Option<String>,
    /// Wall time from runner construction to drain completion.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Whether every job in the batch succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

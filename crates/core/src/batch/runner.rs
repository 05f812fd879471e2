//! Batch runner: submits fallible jobs and aggregates the outcome.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::limiter::{LimiterError, Ticket};
use crate::metrics;

use super::executor::BatchExecutor;
use super::types::BatchReport;

/// Counters shared between the runner and its spawned jobs.
#[derive(Default)]
struct RunnerStats {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

/// Drives one batch of fallible jobs through a [`BatchExecutor`].
///
/// The runner owns the accounting that the core executor deliberately
/// refuses to do: per-job success/failure counts, the complete list of
/// failure messages, structured logging and metrics. A failing job never
/// stops the batch - siblings keep running and the overall outcome is read
/// from the [`BatchReport`] after [`finish`](Self::finish).
pub struct BatchRunner {
    executor: Arc<BatchExecutor>,
    stats: Arc<RunnerStats>,
    submitted: AtomicUsize,
    submit_delay: Option<Duration>,
    started_at: Instant,
}

impl BatchRunner {
    /// Creates a runner over a fresh executor with `limit` slots.
    pub fn new(limit: usize) -> Self {
        Self::with_executor(BatchExecutor::new(limit))
    }

    /// Creates a runner over an existing executor.
    pub fn with_executor(executor: BatchExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            stats: Arc::new(RunnerStats::default()),
            submitted: AtomicUsize::new(0),
            submit_delay: None,
            started_at: Instant::now(),
        }
    }

    /// Creates a runner from configuration.
    ///
    /// Applies the config coercions: a zero concurrency falls back to the
    /// documented default, and a nonzero submit delay forces the
    /// concurrency to 1 so the pacing stays predictable.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        let limit = config.effective_concurrency();
        if config.submit_delay_ms > 0 && config.concurrency != 1 {
            info!(
                delay_ms = config.submit_delay_ms,
                "submit delay set, forcing concurrency to 1"
            );
        }

        let mut runner = Self::new(limit);
        if config.submit_delay_ms > 0 {
            runner.submit_delay = Some(Duration::from_millis(config.submit_delay_ms));
        }
        runner
    }

    /// Paces successive submissions by `delay`.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// The executor backing this runner.
    pub fn executor(&self) -> &BatchExecutor {
        &self.executor
    }

    /// Submits one fallible job, blocking while the pool is full.
    ///
    /// On `Ok` the success counter is bumped; on `Err` the failure is
    /// logged, appended to the report's error list and offered to the
    /// first-error cell. `label` identifies the job in logs and messages.
    pub async fn submit<F>(
        &self,
        label: impl Into<String>,
        job: F,
    ) -> Result<Ticket, LimiterError>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let stats = Arc::clone(&self.stats);
        let executor = Arc::clone(&self.executor);

        let ticket = self
            .executor
            .execute(async move {
                metrics::JOBS_IN_FLIGHT.inc();
                match job.await {
                    Ok(()) => {
                        stats.succeeded.fetch_add(1, Ordering::SeqCst);
                        metrics::JOBS_COMPLETED.with_label_values(&["success"]).inc();
                        debug!(job = %label, "job completed");
                    }
                    Err(err) => {
                        stats.failed.fetch_add(1, Ordering::SeqCst);
                        metrics::JOBS_COMPLETED.with_label_values(&["failed"]).inc();
                        warn!(job = %label, error = %err, "job failed");
                        stats
                            .errors
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .push(format!("{label}: {err:#}"));
                        executor.store_first_error(err);
                    }
                }
                metrics::JOBS_IN_FLIGHT.dec();
            })
            .await?;

        self.submitted.fetch_add(1, Ordering::SeqCst);
        metrics::JOBS_SUBMITTED.inc();

        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(ticket)
    }

    /// Drains the executor and assembles the batch outcome.
    pub async fn finish(self) -> BatchReport {
        self.executor.wait_and_close().await;

        let errors = self
            .stats
            .errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let report = BatchReport {
            submitted: self.submitted.load(Ordering::SeqCst),
            succeeded: self.stats.succeeded.load(Ordering::SeqCst),
            failed: self.stats.failed.load(Ordering::SeqCst),
            first_error: self.executor.first_error().map(|e| format!("{e:#}")),
            errors,
            elapsed: self.started_at.elapsed(),
        };

        metrics::BATCH_DURATION.observe(report.elapsed.as_secs_f64());
        info!(
            submitted = report.submitted,
            succeeded = report.succeeded,
            failed = report.failed,
            "batch finished"
        );

        report
    }
}

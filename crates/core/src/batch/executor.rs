//! Limiter wrapped with a first-error cell.

use std::future::Future;

use anyhow::Error;

use crate::config::ExecutorConfig;
use crate::limiter::{ConcurrencyLimiter, LimiterError, Ticket};

use super::first_error::FirstError;

/// Concurrency cap used for IO-bound batches when a limit of zero is
/// requested. Deliberately lower than the raw limiter default: batches of
/// IO jobs saturate quickly.
pub const DEFAULT_IO_CONCURRENCY: usize = 4;

/// A [`ConcurrencyLimiter`] paired with a [`FirstError`] cell.
///
/// Jobs that fail report their error through
/// [`store_first_error`](Self::store_first_error); the executor itself has
/// no knowledge of why a job failed beyond the error value handed to it.
/// One instance covers one batch - the error cell is never reset.
pub struct BatchExecutor {
    limiter: ConcurrencyLimiter,
    first_error: FirstError,
}

impl BatchExecutor {
    /// Creates an executor with `limit` concurrent slots.
    ///
    /// A limit of zero is coerced to [`DEFAULT_IO_CONCURRENCY`].
    pub fn new(limit: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_IO_CONCURRENCY } else { limit };
        Self {
            limiter: ConcurrencyLimiter::new(limit),
            first_error: FirstError::new(),
        }
    }

    /// Creates an executor sized by the configured IO concurrency.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.io_concurrency)
    }

    /// Submits a job; see [`ConcurrencyLimiter::execute`].
    pub async fn execute<F>(&self, job: F) -> Result<Ticket, LimiterError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.limiter.execute(job).await
    }

    /// Submits a ticket-aware job; see
    /// [`ConcurrencyLimiter::execute_with_ticket`].
    pub async fn execute_with_ticket<F, Fut>(&self, job: F) -> Result<Ticket, LimiterError>
    where
        F: FnOnce(Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.limiter.execute_with_ticket(job).await
    }

    /// Drains the underlying pool; see
    /// [`ConcurrencyLimiter::wait_and_close`].
    pub async fn wait_and_close(&self) {
        self.limiter.wait_and_close().await;
    }

    /// Attempts to record `err` as the batch error.
    ///
    /// Returns `true` if this call's error was retained, `false` if an
    /// earlier concurrent failure already won the race.
    pub fn store_first_error(&self, err: Error) -> bool {
        self.first_error.store(err)
    }

    /// The retained batch error, or `None` if no job has reported one.
    ///
    /// Only a complete answer once called after
    /// [`wait_and_close`](Self::wait_and_close).
    pub fn first_error(&self) -> Option<&Error> {
        self.first_error.get()
    }

    /// Consumes the executor, yielding the retained batch error.
    pub fn into_first_error(self) -> Option<Error> {
        self.first_error.into_inner()
    }

    /// See [`ConcurrencyLimiter::in_progress_count`].
    pub fn in_progress_count(&self) -> i64 {
        self.limiter.in_progress_count()
    }

    /// The effective concurrency cap.
    pub fn limit(&self) -> usize {
        self.limiter.limit()
    }
}

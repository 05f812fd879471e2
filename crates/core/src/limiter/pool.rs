//! Ticket pool implementation.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Concurrency cap used when a limit of zero is requested.
pub const DEFAULT_LIMIT: usize = 100;

/// Identity of one of the `limit` concurrent execution slots.
///
/// Tickets are allocated once at pool construction and recycled for the
/// lifetime of the limiter; values are always in `0..limit`. A ticket is
/// held by at most one running job at a time.
pub type Ticket = usize;

/// Error type for limiter operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LimiterError {
    /// The pool was drained by `wait_and_close`; no further jobs are accepted.
    #[error("limiter closed")]
    Closed,
}

/// Returns a job's ticket to the pool when the job finishes.
///
/// Lives inside the spawned task for the whole job body, so the slot is
/// reclaimed on every exit path - a panicking job releases during unwind.
struct TicketGuard {
    ticket: Ticket,
    tickets: mpsc::Sender<Ticket>,
    in_progress: Arc<AtomicI64>,
}

impl Drop for TicketGuard {
    fn drop(&mut self) {
        // Decrement before the ticket re-enters the pool, so the counter
        // never reads above the limit. The send itself cannot fill the
        // channel - it is sized to hold every ticket - and only fails once
        // the pool has been closed, at which point the ticket is retired.
        self.in_progress.fetch_sub(1, Ordering::SeqCst);
        let _ = self.tickets.try_send(self.ticket);
    }
}

/// Bounded-concurrency job executor.
///
/// Owns a pool of `limit` tickets. Each submitted job borrows one ticket
/// for its lifetime; while the pool is empty, submission blocks the caller.
/// That blocking is the only backpressure mechanism - once a ticket is
/// acquired the job runs independently and submission returns.
///
/// The limiter is opinion-free about job outcomes: it never retries, never
/// logs and never inspects what a job did. It only guarantees the slot is
/// reclaimed when the job finishes, however it finishes.
pub struct ConcurrencyLimiter {
    limit: usize,
    tickets_tx: mpsc::Sender<Ticket>,
    tickets_rx: Mutex<mpsc::Receiver<Ticket>>,
    in_progress: Arc<AtomicI64>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter with `limit` concurrent slots.
    ///
    /// A limit of zero is coerced to [`DEFAULT_LIMIT`] rather than rejected.
    /// The pool cannot be resized after construction.
    pub fn new(limit: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        let (tickets_tx, tickets_rx) = mpsc::channel(limit);

        for ticket in 0..limit {
            tickets_tx
                .try_send(ticket)
                .expect("pool is sized to hold every ticket");
        }

        Self {
            limit,
            tickets_tx,
            tickets_rx: Mutex::new(tickets_rx),
            in_progress: Arc::new(AtomicI64::new(0)),
        }
    }

    /// The effective concurrency cap.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of jobs currently holding a ticket.
    ///
    /// The counter is not synchronized with pool state: the value is a
    /// momentary, possibly stale snapshot. Use it for observability only,
    /// never for correctness decisions.
    pub fn in_progress_count(&self) -> i64 {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Submits a job, blocking until a ticket is available.
    ///
    /// Returns as soon as the job has been launched on its own task; it
    /// does not wait for the job to finish. The returned ticket identity
    /// is informational.
    ///
    /// Returns [`LimiterError::Closed`] once the pool has been drained by
    /// [`wait_and_close`](Self::wait_and_close).
    pub async fn execute<F>(&self, job: F) -> Result<Ticket, LimiterError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.execute_with_ticket(move |_| job).await
    }

    /// Same admission and release contract as [`execute`](Self::execute),
    /// but the job receives its own ticket identity - useful for
    /// slot-indexed resources or log correlation.
    pub async fn execute_with_ticket<F, Fut>(&self, job: F) -> Result<Ticket, LimiterError>
    where
        F: FnOnce(Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.acquire().await?;
        self.in_progress.fetch_add(1, Ordering::SeqCst);

        let guard = TicketGuard {
            ticket,
            tickets: self.tickets_tx.clone(),
            in_progress: Arc::clone(&self.in_progress),
        };

        tokio::spawn(async move {
            // Declared before the job future so it drops after it: the
            // ticket re-enters the pool only once the job body is gone.
            let _guard = guard;
            job(ticket).await;
        });

        Ok(ticket)
    }

    /// Drain barrier: blocks until every outstanding job has released its
    /// ticket, then closes the pool permanently.
    ///
    /// Implemented by re-acquiring all `limit` tickets into the caller's
    /// hand. After this returns, further submissions fail with
    /// [`LimiterError::Closed`]; the limiter cannot be reused.
    ///
    /// Submitting jobs concurrently with an in-flight `wait_and_close` is
    /// undefined by contract and is the caller's responsibility to avoid.
    pub async fn wait_and_close(&self) {
        let mut tickets = self.tickets_rx.lock().await;
        for _ in 0..self.limit {
            if tickets.recv().await.is_none() {
                // Pool already closed by an earlier drain.
                break;
            }
        }
        tickets.close();
    }

    async fn acquire(&self) -> Result<Ticket, LimiterError> {
        let mut tickets = self.tickets_rx.lock().await;
        tickets.recv().await.ok_or(LimiterError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[test]
    fn test_zero_limit_uses_default() {
        let limiter = ConcurrencyLimiter::new(0);
        assert_eq!(limiter.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_explicit_limit() {
        let limiter = ConcurrencyLimiter::new(7);
        assert_eq!(limiter.limit(), 7);
    }

    #[tokio::test]
    async fn test_execute_returns_ticket_in_range() {
        let limiter = ConcurrencyLimiter::new(3);

        for _ in 0..10 {
            let ticket = assert_ok!(limiter.execute(async {}).await);
            assert!(ticket < 3, "ticket {} out of range", ticket);
        }

        limiter.wait_and_close().await;
    }

    #[tokio::test]
    async fn test_all_jobs_complete_before_wait_returns() {
        let limiter = ConcurrencyLimiter::new(4);
        let counter = Arc::new(AtomicU64::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            assert_ok!(
                limiter
                    .execute(async move {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
            );
        }

        limiter.wait_and_close().await;
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn test_wait_with_no_jobs_submitted() {
        let limiter = ConcurrencyLimiter::new(5);
        limiter.wait_and_close().await;
        assert_eq!(limiter.in_progress_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_after_close_fails() {
        let limiter = ConcurrencyLimiter::new(2);
        assert_ok!(limiter.execute(async {}).await);
        limiter.wait_and_close().await;

        let result = limiter.execute(async {}).await;
        assert_eq!(result, Err(LimiterError::Closed));
    }

    #[tokio::test]
    async fn test_in_progress_never_exceeds_limit() {
        let limiter = ConcurrencyLimiter::new(3);

        for _ in 0..20 {
            assert_ok!(
                limiter
                    .execute(async {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    })
                    .await
            );
            assert!(limiter.in_progress_count() <= 3);
        }

        limiter.wait_and_close().await;
        assert_eq!(limiter.in_progress_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_with_ticket_passes_identity() {
        let limiter = ConcurrencyLimiter::new(2);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        for _ in 0..8 {
            let seen = Arc::clone(&seen);
            assert_ok!(
                limiter
                    .execute_with_ticket(move |ticket| async move {
                        seen.lock().unwrap_or_else(|e| e.into_inner()).push(ticket);
                    })
                    .await
            );
        }

        limiter.wait_and_close().await;

        let seen = seen.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|&t| t < 2));
    }

    #[tokio::test]
    async fn test_panicking_job_releases_its_ticket() {
        let limiter = ConcurrencyLimiter::new(1);

        assert_ok!(limiter.execute(async { panic!("job blew up") }).await);

        // If the ticket leaked, this second submission would hang forever.
        let done = Arc::new(AtomicU64::new(0));
        let flag = Arc::clone(&done);
        assert_ok!(
            limiter
                .execute(async move {
                    flag.fetch_add(1, Ordering::SeqCst);
                })
                .await
        );

        limiter.wait_and_close().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_drain_returns_immediately() {
        let limiter = ConcurrencyLimiter::new(3);
        limiter.wait_and_close().await;
        limiter.wait_and_close().await;
    }
}

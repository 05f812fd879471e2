//! Concurrency measurement probe.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::limiter::Ticket;

/// Records how many jobs are running at once and which tickets they hold.
///
/// Jobs call [`enter`](Self::enter) when they start and [`exit`](Self::exit)
/// when they finish (or use [`run`](Self::run), which does both around a
/// sleep). The probe tracks the peak observed parallelism, the number of
/// completed jobs, and whether any ticket was ever held by two jobs at the
/// same time.
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    active: AtomicI64,
    peak: AtomicI64,
    completed: AtomicU64,
    occupied: Mutex<HashSet<Ticket>>,
    double_occupancy: AtomicBool,
}

impl ConcurrencyProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marks a job as started on `ticket`.
    pub fn enter(&self, ticket: Ticket) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let mut occupied = self.occupied.lock().unwrap_or_else(|e| e.into_inner());
        if !occupied.insert(ticket) {
            self.double_occupancy.store(true, Ordering::SeqCst);
        }
    }

    /// Marks the job on `ticket` as finished.
    pub fn exit(&self, ticket: Ticket) {
        self.occupied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&ticket);
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Enter, sleep for `duration`, exit.
    pub async fn run(&self, ticket: Ticket, duration: Duration) {
        self.enter(ticket);
        tokio::time::sleep(duration).await;
        self.exit(ticket);
    }

    /// Highest number of jobs observed running at once.
    pub fn peak(&self) -> i64 {
        self.peak.load(Ordering::SeqCst)
    }

    /// Jobs that have entered and exited.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Whether a ticket was ever held by two jobs simultaneously.
    pub fn saw_double_occupancy(&self) -> bool {
        self.double_occupancy.load(Ordering::SeqCst)
    }
}

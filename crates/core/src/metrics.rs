//! Prometheus metrics for batch execution.
//!
//! Updated by the [`BatchRunner`](crate::batch::BatchRunner) only - the
//! core limiter stays silent about job outcomes.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts};

/// Jobs submitted total.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("convoy_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs completed total by result.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convoy_jobs_completed_total", "Total jobs completed"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Jobs currently holding a ticket.
pub static JOBS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("convoy_jobs_in_flight", "Jobs currently holding a ticket").unwrap()
});

/// Batch duration in seconds, from runner construction to drain.
pub static BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("convoy_batch_duration_seconds", "Duration of whole batches")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 1800.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_IN_FLIGHT.clone()),
        Box::new(BATCH_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        let names: Vec<_> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"convoy_jobs_submitted_total".to_string()));
        assert!(names.contains(&"convoy_batch_duration_seconds".to_string()));
    }
}

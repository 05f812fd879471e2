//! Batch execution with first-error aggregation.
//!
//! This module layers batch-level failure reporting on top of the
//! [`ConcurrencyLimiter`](crate::limiter::ConcurrencyLimiter):
//! - [`FirstError`]: a write-once cell retaining exactly one error per batch
//! - [`BatchExecutor`]: a limiter plus a first-error cell, for callers that
//!   wire their own job closures
//! - [`BatchRunner`]: submits fallible jobs, keeps the complete per-failure
//!   message list and success/failure counts, and emits a [`BatchReport`]
//!   after the drain
//!
//! A failing job never aborts the batch: every submitted job runs
//! regardless of sibling failures, and the batch outcome is decided from
//! the aggregated result after `wait_and_close`.

mod executor;
mod first_error;
mod runner;
mod types;

pub use executor::{BatchExecutor, DEFAULT_IO_CONCURRENCY};
pub use first_error::FirstError;
pub use runner::BatchRunner;
pub use types::BatchReport;

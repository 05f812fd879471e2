//! Bounded-concurrency job executor.
//!
//! This module provides the `ConcurrencyLimiter`, a pool of `limit` tickets
//! acting as a counting semaphore over spawned jobs:
//! - Submission: blocks the *submitter* while the pool is empty, then
//!   launches the job on its own task and returns immediately
//! - Release: guaranteed on every job exit path, including panics
//! - Drain: `wait_and_close` re-acquires every ticket, then closes the pool
//!
//! # Example
//!
//! ```ignore
//! use convoy_core::limiter::ConcurrencyLimiter;
//!
//! let limiter = ConcurrencyLimiter::new(8);
//! for url in urls {
//!     limiter.execute(async move { fetch(url).await; }).await?;
//! }
//! limiter.wait_and_close().await;
//! ```

mod pool;

pub use pool::{ConcurrencyLimiter, LimiterError, Ticket, DEFAULT_LIMIT};

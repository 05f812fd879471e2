//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use convoy_core::testing::ConcurrencyProbe;
//!
//! let probe = ConcurrencyProbe::new();
//! limiter
//!     .execute_with_ticket({
//!         let probe = Arc::clone(&probe);
//!         move |ticket| async move { probe.run(ticket, Duration::from_millis(20)).await }
//!     })
//!     .await?;
//! // After the drain:
//! assert!(probe.peak() <= limit as i64);
//! assert!(!probe.saw_double_occupancy());
//! ```

mod probe;

pub use probe::ConcurrencyProbe;

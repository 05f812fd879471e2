//! Write-once error cell.
//!
//! Concurrently failing jobs race to record their error; exactly one wins
//! for the lifetime of the batch. Which one wins is unspecified - the cell
//! promises retention of a single error, not the chronologically earliest.

use anyhow::Error;
use once_cell::sync::OnceCell;

/// Retains the first error successfully recorded across a batch of
/// concurrent jobs.
///
/// Thread-safe: any number of workers may call [`store`](Self::store)
/// concurrently. The cell transitions empty -> set at most once and is
/// never cleared or overwritten; a new batch needs a new cell.
#[derive(Debug, Default)]
pub struct FirstError {
    cell: OnceCell<Error>,
}

impl FirstError {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to record `err` as the batch error.
    ///
    /// Returns `true` if this call won the race and the error was retained,
    /// `false` if an earlier failure already occupies the cell. Losing
    /// errors are dropped; an orchestrator wanting the complete list must
    /// keep its own collection.
    pub fn store(&self, err: Error) -> bool {
        self.cell.set(err).is_ok()
    }

    /// The retained error, if any job has failed so far.
    ///
    /// Safe to call at any time, but only a complete answer once the batch
    /// has been drained - while jobs are still running the cell may yet be
    /// filled.
    pub fn get(&self) -> Option<&Error> {
        self.cell.get()
    }

    /// Consumes the cell, yielding the retained error.
    pub fn into_inner(self) -> Option<Error> {
        self.cell.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_first_store_wins() {
        let first_error = FirstError::new();

        assert!(first_error.store(anyhow!("error 1")));
        assert!(!first_error.store(anyhow!("error 2")));

        assert_eq!(first_error.get().unwrap().to_string(), "error 1");
    }

    #[test]
    fn test_empty_cell() {
        let first_error = FirstError::new();
        assert!(first_error.get().is_none());
        assert!(first_error.into_inner().is_none());
    }

    #[test]
    fn test_into_inner_returns_winner() {
        let first_error = FirstError::new();
        first_error.store(anyhow!("boom"));

        let err = first_error.into_inner().unwrap();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_concurrent_stores_retain_exactly_one() {
        use std::sync::Arc;

        let first_error = Arc::new(FirstError::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cell = Arc::clone(&first_error);
                std::thread::spawn(move || cell.store(anyhow!("error {}", i)))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();

        assert_eq!(wins, 1, "exactly one store call should win");
        assert!(first_error.get().is_some());
    }
}

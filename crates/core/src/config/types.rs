//! Executor configuration.

use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_IO_CONCURRENCY;
use crate::limiter::DEFAULT_LIMIT;

/// Configuration for batch execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of jobs simultaneously in flight.
    /// Zero falls back to the documented default.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Concurrency cap for IO-bound batches built through
    /// `BatchExecutor::new(0)`-style call sites.
    #[serde(default = "default_io_concurrency")]
    pub io_concurrency: usize,

    /// Delay between successive submissions in milliseconds.
    /// Useful for rate limiting or reducing load on the remote end.
    /// Nonzero values force the effective concurrency to 1.
    #[serde(default)]
    pub submit_delay_ms: u64,
}

fn default_concurrency() -> usize {
    DEFAULT_LIMIT
}

fn default_io_concurrency() -> usize {
    DEFAULT_IO_CONCURRENCY
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            io_concurrency: default_io_concurrency(),
            submit_delay_ms: 0,
        }
    }
}

impl ExecutorConfig {
    /// Sets the concurrency cap.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the submission delay in milliseconds.
    pub fn with_submit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.submit_delay_ms = delay_ms;
        self
    }

    /// The concurrency cap after applying the documented coercions:
    /// a nonzero submit delay forces 1, zero falls back to the default.
    pub fn effective_concurrency(&self) -> usize {
        if self.submit_delay_ms > 0 {
            return 1;
        }
        if self.concurrency == 0 {
            DEFAULT_LIMIT
        } else {
            self.concurrency
        }
    }
}

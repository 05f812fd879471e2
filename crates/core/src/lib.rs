pub mod batch;
pub mod config;
pub mod limiter;
pub mod metrics;
pub mod testing;

pub use batch::{BatchExecutor, BatchReport, BatchRunner, FirstError, DEFAULT_IO_CONCURRENCY};
pub use config::{load_config, load_config_from_str, ConfigError, ExecutorConfig};
pub use limiter::{ConcurrencyLimiter, LimiterError, Ticket, DEFAULT_LIMIT};

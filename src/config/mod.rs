//! Reporter configuration

pub mod filter;
pub mod reporter_config;
pub mod units;

pub use filter::MetricFilter;
pub use reporter_config::{ReporterConfig, ServerAddress, DEFAULT_BULK_BATCH_SIZE};
pub use units::TimeUnit;

//! Resolved reporter configuration

use std::fmt;

use chrono::format::{Item, StrftimeItems};

use super::filter::MetricFilter;
use super::units::TimeUnit;

/// Default number of documents per bulk request
pub const DEFAULT_BULK_BATCH_SIZE: usize = 2500;

/// Resolved backend address
///
/// Consumed by `DocumentStore` implementations that dial an endpoint; the
/// in-memory store ignores it.
#[derive(Debug, Clone)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Complete reporter configuration
///
/// Immutable once built; constructed and validated by `ReporterBuilder`
/// before the reporter exists.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Backend endpoint, for stores that need one
    pub address: Option<ServerAddress>,

    /// Base index name documents are written to
    pub index: String,

    /// strftime format appended to the index name per cycle.
    /// Empty string disables date partitioning.
    pub index_date_format: String,

    /// Prefix prepended to every metric name as `prefix.name`
    pub prefix: Option<String>,

    /// Target unit for meter/timer rate fields
    pub rate_unit: TimeUnit,

    /// Target unit for timer duration fields
    pub duration_unit: TimeUnit,

    /// Metric selection predicate
    pub filter: MetricFilter,

    /// Maximum documents per bulk request
    pub bulk_batch_size: usize,

    /// Full-name prefix selecting records for percolation; percolation is
    /// active only when a notifier is configured as well
    pub percolation_prefix: Option<String>,
}

impl ReporterConfig {
    /// Validate required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.index.is_empty() {
            return Err("index base name must not be empty".to_string());
        }
        if self.index.contains(['*', ' ']) {
            return Err(format!("invalid index base name: {:?}", self.index));
        }
        if self.bulk_batch_size == 0 {
            return Err("bulk batch size must be greater than zero".to_string());
        }
        if StrftimeItems::new(&self.index_date_format).any(|item| matches!(item, Item::Error)) {
            return Err(format!(
                "invalid index date format: {:?}",
                self.index_date_format
            ));
        }
        Ok(())
    }

    /// Apply the configured prefix to a registry name
    pub fn prefixed(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, name),
            _ => name.to_string(),
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            address: None,
            index: "metrics".to_string(),
            index_date_format: "%Y-%m".to_string(),
            prefix: None,
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            filter: MetricFilter::all(),
            bulk_batch_size: DEFAULT_BULK_BATCH_SIZE,
            percolation_prefix: None,
        }
    }
}

//! Reporting pipeline
//!
//! This module provides:
//! - Snapshot collection with unit normalization
//! - Time-partitioned index name resolution
//! - Idempotent schema template bootstrap
//! - Bulk document submission in bounded batches
//! - Standing-query percolation with notification callbacks
//! - The `Reporter` orchestrating one cycle per `report()` call

pub mod bulk;
pub mod collector;
pub mod index_name;
pub mod percolate;
pub mod reporter;
pub mod template;

pub use bulk::{write_records, WriteOutcome};
pub use collector::{collect, FieldValue, MetricRecord, Snapshot};
pub use index_name::{resolve, IndexTarget};
pub use percolate::{Notifier, PercolationMatch};
pub use reporter::{CycleSummary, Reporter, ReporterBuilder};
pub use template::{default_template, ensure_template, TEMPLATE_NAME};

//! Reporting cycle orchestration
//!
//! Ties collection, index resolution, template bootstrap, bulk writing
//! and percolation into one synchronous `report()` operation. The
//! reporter owns no thread; an external scheduler or a manual caller
//! drives it, and concurrent invocations are tolerated.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use super::bulk::write_records;
use super::collector::{collect, MetricRecord};
use super::index_name::resolve;
use super::percolate::{evaluate, Notifier};
use super::template::ensure_template;
use crate::backend::DocumentStore;
use crate::config::{MetricFilter, ReporterConfig, ServerAddress, TimeUnit};
use crate::registry::MetricRegistry;
use crate::utils::{PartialWriteError, ReportError, Result};

/// Outcome of one successful reporting cycle
#[derive(Debug, Clone)]
pub struct CycleSummary {
    /// Resolved index the cycle wrote to
    pub index: String,
    /// Documents acknowledged by the backend
    pub written: usize,
    /// Metrics skipped because their value could not be read
    pub skipped: usize,
    /// Percolation notifications delivered
    pub matches: usize,
}

/// Builder for a `Reporter`
///
/// Collects the configuration surface, validates it, then produces the
/// immutable reporter.
pub struct ReporterBuilder {
    registry: Arc<MetricRegistry>,
    config: ReporterConfig,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ReporterBuilder {
    fn new(registry: Arc<MetricRegistry>) -> Self {
        Self {
            registry,
            config: ReporterConfig::default(),
            notifier: None,
        }
    }

    /// Backend endpoint, for stores that dial one
    pub fn connect_to(mut self, address: ServerAddress) -> Self {
        self.config.address = Some(address);
        self
    }

    /// Base index name (default `metrics`)
    pub fn index(mut self, index: &str) -> Self {
        self.config.index = index.to_string();
        self
    }

    /// strftime suffix appended to the index name per cycle; empty
    /// disables date partitioning (default `%Y-%m`)
    pub fn index_date_format(mut self, format: &str) -> Self {
        self.config.index_date_format = format.to_string();
        self
    }

    /// Prefix prepended to every metric name
    pub fn prefixed_with(mut self, prefix: &str) -> Self {
        self.config.prefix = Some(prefix.to_string());
        self
    }

    /// Target unit for rate fields (default seconds)
    pub fn convert_rates_to(mut self, unit: TimeUnit) -> Self {
        self.config.rate_unit = unit;
        self
    }

    /// Target unit for duration fields (default milliseconds)
    pub fn convert_durations_to(mut self, unit: TimeUnit) -> Self {
        self.config.duration_unit = unit;
        self
    }

    /// Metric selection predicate (default: accept all)
    pub fn filter(mut self, filter: MetricFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Maximum documents per bulk request
    pub fn bulk_batch_size(mut self, size: usize) -> Self {
        self.config.bulk_batch_size = size;
        self
    }

    /// Percolate records whose full name starts with this prefix
    pub fn percolate_metrics(mut self, name_prefix: &str) -> Self {
        self.config.percolation_prefix = Some(name_prefix.to_string());
        self
    }

    /// Notifier invoked for every percolation match
    pub fn percolate_notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Validate the configuration and build the reporter
    pub fn build(self, store: Arc<dyn DocumentStore>) -> Result<Reporter> {
        self.config.validate().map_err(ReportError::Config)?;
        match (&self.config.percolation_prefix, &self.notifier) {
            (Some(_), None) => {
                return Err(ReportError::Config(
                    "percolation prefix configured without a notifier".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ReportError::Config(
                    "percolation notifier configured without a name prefix".to_string(),
                ))
            }
            _ => {}
        }

        Ok(Reporter {
            registry: self.registry,
            store,
            config: self.config,
            notifier: self.notifier,
            template_confirmed: AtomicBool::new(false),
        })
    }
}

/// Periodic metrics reporter
///
/// `report()` is synchronous and safe to invoke concurrently; the only
/// state shared across cycles is the template-confirmed flag.
pub struct Reporter {
    registry: Arc<MetricRegistry>,
    store: Arc<dyn DocumentStore>,
    config: ReporterConfig,
    notifier: Option<Arc<dyn Notifier>>,
    template_confirmed: AtomicBool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .field("has_notifier", &self.notifier.is_some())
            .field("template_confirmed", &self.template_confirmed)
            .finish()
    }
}

impl Reporter {
    /// Start configuring a reporter for a registry
    pub fn builder(registry: Arc<MetricRegistry>) -> ReporterBuilder {
        ReporterBuilder::new(registry)
    }

    /// The active configuration
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Run one reporting cycle
    ///
    /// Blocks until collection, writing and (if configured) percolation
    /// have completed or definitively failed. A failed cycle is not
    /// retried; the next invocation starts from a fresh snapshot.
    pub fn report(&self) -> Result<CycleSummary> {
        let now = Utc::now();
        let snapshot = collect(&self.registry, &self.config, now);
        let target = resolve(&self.config.index, &self.config.index_date_format, now);

        if !self.template_confirmed.load(Ordering::Acquire) {
            if let Err(e) = ensure_template(self.store.as_ref(), &self.config.index) {
                error!(error = %e, "Template bootstrap failed, aborting cycle");
                return Err(e.into());
            }
            self.template_confirmed.store(true, Ordering::Release);
        }

        let outcome = write_records(
            self.store.as_ref(),
            &snapshot.records,
            &target,
            self.config.bulk_batch_size,
        )
        .map_err(|e| {
            error!(error = %e, index = %target, "Bulk write failed, aborting cycle");
            ReportError::Connectivity(e)
        })?;

        let mut matches = 0;
        if let (Some(prefix), Some(notifier)) = (&self.config.percolation_prefix, &self.notifier) {
            let rejected: HashSet<usize> = outcome.rejected_positions.iter().copied().collect();
            let written: Vec<&MetricRecord> = snapshot
                .records
                .iter()
                .enumerate()
                .filter(|(position, _)| !rejected.contains(position))
                .map(|(_, record)| record)
                .collect();
            matches = evaluate(
                self.store.as_ref(),
                &written,
                &target,
                prefix,
                notifier.as_ref(),
            )
            .len();
        }

        let summary = CycleSummary {
            index: target.resolved(),
            written: outcome.accepted,
            skipped: snapshot.skipped,
            matches,
        };

        if !outcome.is_complete() {
            info!(
                index = %summary.index,
                accepted = outcome.accepted,
                rejected = outcome.failures.len(),
                "Cycle finished with rejected documents"
            );
            return Err(ReportError::PartialWrite(PartialWriteError {
                attempted: outcome.attempted,
                accepted: outcome.accepted,
                failures: outcome.failures,
            }));
        }

        debug!(
            index = %summary.index,
            written = summary.written,
            skipped = summary.skipped,
            matches = summary.matches,
            "Reporting cycle finished"
        );
        Ok(summary)
    }
}

//! Percolation alerting
//!
//! Matches freshly written documents against the standing queries of the
//! target index and invokes the notifier for each match. Evaluation is
//! stateless across cycles: every cycle recomputes matches from the
//! current values only, with no suppression or edge detection.

use tracing::{debug, warn};

use super::collector::MetricRecord;
use super::index_name::IndexTarget;
use crate::backend::DocumentStore;

/// Callback invoked once per matching standing query per record
///
/// Runs synchronously inside the reporting cycle; implementations must
/// not block indefinitely.
pub trait Notifier: Send + Sync {
    fn notify(&self, record: &MetricRecord, match_id: &str);
}

impl<F> Notifier for F
where
    F: Fn(&MetricRecord, &str) + Send + Sync,
{
    fn notify(&self, record: &MetricRecord, match_id: &str) {
        self(record, match_id)
    }
}

/// One standing-query match emitted during a cycle
#[derive(Debug, Clone)]
pub struct PercolationMatch {
    pub query_id: String,
    pub metric_name: String,
}

/// Evaluate standing queries for every record selected by the prefix
///
/// A percolation request failure for one record is logged and skips only
/// that record; indexing has already completed, so the write outcome is
/// unaffected either way.
pub fn evaluate(
    store: &dyn DocumentStore,
    records: &[&MetricRecord],
    target: &IndexTarget,
    name_prefix: &str,
    notifier: &dyn Notifier,
) -> Vec<PercolationMatch> {
    let index = target.resolved();
    let mut matches = Vec::new();

    for record in records {
        if !record.name.starts_with(name_prefix) {
            continue;
        }

        let query_ids =
            match store.percolate(&index, record.kind.as_str(), &record.document()) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(metric = %record.name, error = %e, "Percolation request failed");
                    continue;
                }
            };

        for query_id in query_ids {
            notifier.notify(record, &query_id);
            matches.push(PercolationMatch {
                query_id,
                metric_name: record.name.clone(),
            });
        }
    }

    debug!(
        index = %index,
        matches = matches.len(),
        "Percolation evaluation finished"
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryStore, StandingQuery};
    use crate::config::ReporterConfig;
    use crate::registry::MetricRegistry;
    use crate::report::collector::collect;
    use crate::report::index_name::resolve;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, record: &MetricRecord, match_id: &str) {
            self.seen
                .lock()
                .push((match_id.to_string(), record.name.clone()));
        }
    }

    fn collect_records(registry: &MetricRegistry) -> Vec<MetricRecord> {
        collect(registry, &ReporterConfig::default(), Utc::now()).records
    }

    #[test]
    fn test_matching_record_notifies() {
        let store = MemoryStore::new();
        let target = resolve("metrics", "", Utc::now());
        store.register_query(
            "metrics",
            "high-evictions",
            StandingQuery::new().gte("count", 20.0),
        );

        let registry = MetricRegistry::new();
        registry.counter("app.evictions").inc_by(25);
        let records = collect_records(&registry);
        let refs: Vec<&MetricRecord> = records.iter().collect();

        let notifier = RecordingNotifier::default();
        let matches = evaluate(&store, &refs, &target, "app.", &notifier);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].query_id, "high-evictions");
        let seen = notifier.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("high-evictions".to_string(), "app.evictions".to_string()));
    }

    #[test]
    fn test_prefix_filters_records() {
        let store = MemoryStore::new();
        let target = resolve("metrics", "", Utc::now());
        store.register_query("metrics", "any", StandingQuery::new().gte("count", 0.0));

        let registry = MetricRegistry::new();
        registry.counter("app.requests").inc();
        registry.counter("jvm.threads").inc();
        let records = collect_records(&registry);
        let refs: Vec<&MetricRecord> = records.iter().collect();

        let notifier = RecordingNotifier::default();
        let matches = evaluate(&store, &refs, &target, "app.", &notifier);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].metric_name, "app.requests");
    }

    #[test]
    fn test_multiple_queries_each_notify() {
        let store = MemoryStore::new();
        let target = resolve("metrics", "", Utc::now());
        store.register_query("metrics", "q1", StandingQuery::new().gte("count", 1.0));
        store.register_query("metrics", "q2", StandingQuery::new().gte("count", 2.0));

        let registry = MetricRegistry::new();
        registry.counter("app.hits").inc_by(5);
        let records = collect_records(&registry);
        let refs: Vec<&MetricRecord> = records.iter().collect();

        let notifier = RecordingNotifier::default();
        let matches = evaluate(&store, &refs, &target, "app.", &notifier);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_closure_notifier() {
        let store = MemoryStore::new();
        let target = resolve("metrics", "", Utc::now());
        store.register_query("metrics", "q", StandingQuery::new().gte("count", 0.0));

        let registry = MetricRegistry::new();
        registry.counter("app.hits").inc();
        let records = collect_records(&registry);
        let refs: Vec<&MetricRecord> = records.iter().collect();

        let hits = Arc::new(Mutex::new(0usize));
        let counted = Arc::clone(&hits);
        let notifier = move |_: &MetricRecord, _: &str| {
            *counted.lock() += 1;
        };
        evaluate(&store, &refs, &target, "app.", &notifier);
        assert_eq!(*hits.lock(), 1);
    }
}

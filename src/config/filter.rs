//! Metric filtering for snapshot collection

use std::fmt;
use std::sync::Arc;

use crate::registry::MetricKind;

/// Predicate deciding which metrics a snapshot includes
///
/// The predicate sees the registry-assigned name (before any reporter
/// prefix is applied) and the metric kind. Excluded metrics produce no
/// record and no side effects.
#[derive(Clone, Default)]
pub struct MetricFilter {
    predicate: Option<Arc<dyn Fn(&str, MetricKind) -> bool + Send + Sync>>,
}

impl MetricFilter {
    /// Accept every metric
    pub fn all() -> Self {
        Self { predicate: None }
    }

    /// Accept only metrics matching the predicate
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&str, MetricKind) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Check whether a metric passes the filter
    pub fn accepts(&self, name: &str, kind: MetricKind) -> bool {
        match &self.predicate {
            Some(p) => p(name, kind),
            None => true,
        }
    }
}

impl fmt::Debug for MetricFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predicate {
            Some(_) => write!(f, "MetricFilter(custom)"),
            None => write!(f, "MetricFilter(all)"),
        }
    }
}

//! In-process metrics registry
//!
//! Thread-safe named collection of counters, gauges, histograms, meters
//! and timers. The reporting pipeline consumes it strictly read-only;
//! application code owns and mutates the metric instances.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod timer;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

pub use counter::Counter;
pub use gauge::{Gauge, GaugeError, GaugeValue};
pub use histogram::{Histogram, HistogramSnapshot};
pub use meter::{Meter, MeterSnapshot};
pub use timer::{StartedTimer, Timer, TimerSnapshot};

/// Closed set of metric kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Meter,
    Timer,
}

impl MetricKind {
    /// Document type string used in the storage backend
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Meter => "meter",
            MetricKind::Timer => "timer",
        }
    }

    /// All kinds, in document-type order
    pub fn all() -> [MetricKind; 5] {
        [
            MetricKind::Counter,
            MetricKind::Gauge,
            MetricKind::Histogram,
            MetricKind::Meter,
            MetricKind::Timer,
        ]
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered metric instance
#[derive(Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<dyn Gauge>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Meter(_) => MetricKind::Meter,
            Metric::Timer(_) => MetricKind::Timer,
        }
    }
}

/// Join dotted metric name segments, skipping empty parts
pub fn metric_name(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// Thread-safe metrics registry
#[derive(Default)]
pub struct MetricRegistry {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a counter
    ///
    /// Panics if the name is already registered as a different kind.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        match self.get_or_insert(name, || Metric::Counter(Arc::new(Counter::new()))) {
            Metric::Counter(c) => c,
            other => panic!("{} is already registered as a {}", name, other.kind()),
        }
    }

    /// Get or create a histogram
    ///
    /// Panics if the name is already registered as a different kind.
    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        match self.get_or_insert(name, || Metric::Histogram(Arc::new(Histogram::new()))) {
            Metric::Histogram(h) => h,
            other => panic!("{} is already registered as a {}", name, other.kind()),
        }
    }

    /// Get or create a meter
    ///
    /// Panics if the name is already registered as a different kind.
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        match self.get_or_insert(name, || Metric::Meter(Arc::new(Meter::new()))) {
            Metric::Meter(m) => m,
            other => panic!("{} is already registered as a {}", name, other.kind()),
        }
    }

    /// Get or create a timer
    ///
    /// Panics if the name is already registered as a different kind.
    pub fn timer(&self, name: &str) -> Arc<Timer> {
        match self.get_or_insert(name, || Metric::Timer(Arc::new(Timer::new()))) {
            Metric::Timer(t) => t,
            other => panic!("{} is already registered as a {}", name, other.kind()),
        }
    }

    /// Register a gauge under a name
    ///
    /// Panics if the name is already registered.
    pub fn register_gauge<G: Gauge + 'static>(&self, name: &str, gauge: G) {
        let mut metrics = self.metrics.write();
        if metrics.contains_key(name) {
            panic!("{} is already registered", name);
        }
        metrics.insert(name.to_string(), Metric::Gauge(Arc::new(gauge)));
    }

    /// Remove a metric by name
    pub fn remove(&self, name: &str) -> bool {
        self.metrics.write().remove(name).is_some()
    }

    /// Look up a metric by name
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics.read().get(name).cloned()
    }

    /// Number of registered metrics
    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }

    /// All metrics, sorted by name for deterministic iteration
    pub fn sorted_metrics(&self) -> Vec<(String, Metric)> {
        let metrics = self.metrics.read();
        let mut entries: Vec<(String, Metric)> = metrics
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn get_or_insert(&self, name: &str, create: impl FnOnce() -> Metric) -> Metric {
        // First try read lock
        {
            let metrics = self.metrics.read();
            if let Some(metric) = metrics.get(name) {
                return metric.clone();
            }
        }

        // Need write lock to create
        let mut metrics = self.metrics.write();
        metrics
            .entry(name.to_string())
            .or_insert_with(create)
            .clone()
    }
}

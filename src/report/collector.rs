//! Snapshot collection
//!
//! Drains the registry into a finite sequence of normalized metric
//! records reflecting each metric's state at call time. Unit conversion
//! for rates and durations happens here so downstream stages only see
//! final field values.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::ReporterConfig;
use crate::registry::{GaugeValue, Metric, MetricKind, MetricRegistry, TimerSnapshot};

/// One field of a metric record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Int(v) => Value::from(*v),
            FieldValue::Uint(v) => Value::from(*v),
            FieldValue::Float(v) => {
                serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number)
            }
            FieldValue::Text(v) => Value::from(v.clone()),
        }
    }
}

impl From<GaugeValue> for FieldValue {
    fn from(value: GaugeValue) -> Self {
        match value {
            GaugeValue::Int(v) => FieldValue::Int(v),
            GaugeValue::Float(v) => FieldValue::Float(v),
            GaugeValue::Text(v) => FieldValue::Text(v),
        }
    }
}

/// Normalized state of one metric at one reporting instant
///
/// Immutable once produced; one instance per metric per cycle.
#[derive(Debug, Clone)]
pub struct MetricRecord {
    pub kind: MetricKind,
    /// Full name: configured prefix + "." + registry name
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Kind-specific fields, in serialization order
    pub fields: Vec<(String, FieldValue)>,
}

impl MetricRecord {
    /// Serialize into the stored document form: `name`, `timestamp`,
    /// then the kind-specific fields
    pub fn document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("name".to_string(), Value::from(self.name.clone()));
        doc.insert(
            "timestamp".to_string(),
            Value::from(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        for (field, value) in &self.fields {
            doc.insert(field.clone(), value.to_json());
        }
        Value::Object(doc)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// Result of draining the registry once
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<MetricRecord>,
    /// Metrics skipped because their value could not be read
    pub skipped: usize,
}

/// Collect one record per live, filter-accepted metric
///
/// A metric whose value cannot be read (a failing gauge) is skipped with
/// a logged error; collection continues for the rest. The registry is
/// never mutated.
pub fn collect(registry: &MetricRegistry, config: &ReporterConfig, now: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for (name, metric) in registry.sorted_metrics() {
        if !config.filter.accepts(&name, metric.kind()) {
            continue;
        }

        let fields = match fields_for(&metric, config) {
            Ok(fields) => fields,
            Err(reason) => {
                warn!(metric = %name, %reason, "Skipping unreadable metric");
                snapshot.skipped += 1;
                continue;
            }
        };

        snapshot.records.push(MetricRecord {
            kind: metric.kind(),
            name: config.prefixed(&name),
            timestamp: now,
            fields,
        });
    }

    snapshot
}

fn fields_for(metric: &Metric, config: &ReporterConfig) -> Result<Vec<(String, FieldValue)>, String> {
    let rate_factor = config.rate_unit.rate_factor();
    let duration_factor = config.duration_unit.duration_factor();

    let fields = match metric {
        Metric::Counter(counter) => {
            vec![("count".to_string(), FieldValue::Int(counter.count()))]
        }
        Metric::Gauge(gauge) => {
            let value = gauge.value().map_err(|e| e.to_string())?;
            vec![("value".to_string(), FieldValue::from(value))]
        }
        Metric::Histogram(histogram) => {
            let s = histogram.snapshot();
            vec![
                ("count".to_string(), FieldValue::Uint(s.count)),
                ("min".to_string(), FieldValue::Uint(s.min)),
                ("max".to_string(), FieldValue::Uint(s.max)),
                ("mean".to_string(), FieldValue::Float(s.mean)),
                ("stddev".to_string(), FieldValue::Float(s.stddev)),
                ("p50".to_string(), FieldValue::Uint(s.p50)),
                ("p75".to_string(), FieldValue::Uint(s.p75)),
                ("p95".to_string(), FieldValue::Uint(s.p95)),
                ("p98".to_string(), FieldValue::Uint(s.p98)),
                ("p99".to_string(), FieldValue::Uint(s.p99)),
                ("p999".to_string(), FieldValue::Uint(s.p999)),
            ]
        }
        Metric::Meter(meter) => {
            let s = meter.snapshot();
            vec![
                ("count".to_string(), FieldValue::Uint(s.count)),
                (
                    "mean_rate".to_string(),
                    FieldValue::Float(s.mean_rate * rate_factor),
                ),
                (
                    "m1_rate".to_string(),
                    FieldValue::Float(s.m1_rate * rate_factor),
                ),
                (
                    "m5_rate".to_string(),
                    FieldValue::Float(s.m5_rate * rate_factor),
                ),
                (
                    "m15_rate".to_string(),
                    FieldValue::Float(s.m15_rate * rate_factor),
                ),
            ]
        }
        Metric::Timer(timer) => timer_fields(&timer.snapshot(), duration_factor, rate_factor),
    };

    Ok(fields)
}

fn timer_fields(
    s: &TimerSnapshot,
    duration_factor: f64,
    rate_factor: f64,
) -> Vec<(String, FieldValue)> {
    let d = |ns: f64| FieldValue::Float(ns * duration_factor);
    vec![
        ("count".to_string(), FieldValue::Uint(s.count)),
        ("min".to_string(), d(s.min_ns as f64)),
        ("max".to_string(), d(s.max_ns as f64)),
        ("mean".to_string(), d(s.mean_ns)),
        ("stddev".to_string(), d(s.stddev_ns)),
        ("p50".to_string(), d(s.p50_ns as f64)),
        ("p75".to_string(), d(s.p75_ns as f64)),
        ("p95".to_string(), d(s.p95_ns as f64)),
        ("p98".to_string(), d(s.p98_ns as f64)),
        ("p99".to_string(), d(s.p99_ns as f64)),
        ("p999".to_string(), d(s.p999_ns as f64)),
        (
            "mean_rate".to_string(),
            FieldValue::Float(s.rate.mean_rate * rate_factor),
        ),
        (
            "m1_rate".to_string(),
            FieldValue::Float(s.rate.m1_rate * rate_factor),
        ),
        (
            "m5_rate".to_string(),
            FieldValue::Float(s.rate.m5_rate * rate_factor),
        ),
        (
            "m15_rate".to_string(),
            FieldValue::Float(s.rate.m15_rate * rate_factor),
        ),
    ]
}

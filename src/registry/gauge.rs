//! User-supplied gauges

use std::fmt;

use thiserror::Error;

/// Value produced by a gauge read
///
/// Numeric or string; passed through to the stored document as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for GaugeValue {
    fn from(v: i64) -> Self {
        GaugeValue::Int(v)
    }
}

impl From<f64> for GaugeValue {
    fn from(v: f64) -> Self {
        GaugeValue::Float(v)
    }
}

impl From<&str> for GaugeValue {
    fn from(v: &str) -> Self {
        GaugeValue::Text(v.to_string())
    }
}

impl From<String> for GaugeValue {
    fn from(v: String) -> Self {
        GaugeValue::Text(v)
    }
}

impl fmt::Display for GaugeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaugeValue::Int(v) => write!(f, "{}", v),
            GaugeValue::Float(v) => write!(f, "{}", v),
            GaugeValue::Text(v) => f.write_str(v),
        }
    }
}

/// A gauge read failed
#[derive(Error, Debug)]
#[error("Gauge read failed: {0}")]
pub struct GaugeError(pub String);

/// Read-on-demand metric backed by application code
///
/// Reads may fail; a failing gauge is skipped for that cycle without
/// affecting collection of other metrics.
pub trait Gauge: Send + Sync {
    fn value(&self) -> Result<GaugeValue, GaugeError>;
}

impl<F> Gauge for F
where
    F: Fn() -> Result<GaugeValue, GaugeError> + Send + Sync,
{
    fn value(&self) -> Result<GaugeValue, GaugeError> {
        self()
    }
}

//! Value distribution histogram

use parking_lot::Mutex;

/// Statistical distribution of recorded values
///
/// Backed by an auto-resizing HDR histogram at 3 significant figures
/// behind a mutex.
pub struct Histogram {
    hist: Mutex<hdrhistogram::Histogram<u64>>,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            hist: Mutex::new(
                hdrhistogram::Histogram::new(3).expect("Failed to create histogram"),
            ),
        }
    }

    /// Record a value
    #[inline]
    pub fn update(&self, value: u64) {
        self.hist.lock().saturating_record(value);
    }

    pub fn count(&self) -> u64 {
        self.hist.lock().len()
    }

    /// Point-in-time statistics
    pub fn snapshot(&self) -> HistogramSnapshot {
        let hist = self.hist.lock();
        HistogramSnapshot {
            count: hist.len(),
            min: if hist.is_empty() { 0 } else { hist.min() },
            max: hist.max(),
            mean: hist.mean(),
            stddev: hist.stdev(),
            p50: hist.value_at_percentile(50.0),
            p75: hist.value_at_percentile(75.0),
            p95: hist.value_at_percentile(95.0),
            p98: hist.value_at_percentile(98.0),
            p99: hist.value_at_percentile(99.0),
            p999: hist.value_at_percentile(99.9),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of histogram statistics at a point in time
#[derive(Debug, Clone)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub stddev: f64,
    pub p50: u64,
    pub p75: u64,
    pub p95: u64,
    pub p98: u64,
    pub p99: u64,
    pub p999: u64,
}

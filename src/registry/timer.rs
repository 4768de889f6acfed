//! Duration timer

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::meter::{Meter, MeterSnapshot};

/// Timing metric
///
/// A histogram over call durations (recorded as nanoseconds) plus an
/// embedded meter tracking the call rate.
pub struct Timer {
    durations: Mutex<hdrhistogram::Histogram<u64>>,
    rate: Meter,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            durations: Mutex::new(
                hdrhistogram::Histogram::new(3).expect("Failed to create histogram"),
            ),
            rate: Meter::new(),
        }
    }

    /// Record one timed call
    pub fn update(&self, duration: Duration) {
        self.durations
            .lock()
            .saturating_record(duration.as_nanos() as u64);
        self.rate.mark();
    }

    /// Start a timing context; `stop()` records the elapsed time
    pub fn start(self: &Arc<Self>) -> StartedTimer {
        StartedTimer {
            timer: Arc::clone(self),
            started_at: Instant::now(),
        }
    }

    /// Time a closure
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.update(started.elapsed());
        result
    }

    pub fn count(&self) -> u64 {
        self.durations.lock().len()
    }

    /// Point-in-time duration statistics (nanoseconds) and call rates
    pub fn snapshot(&self) -> TimerSnapshot {
        let durations = self.durations.lock();
        TimerSnapshot {
            count: durations.len(),
            min_ns: if durations.is_empty() {
                0
            } else {
                durations.min()
            },
            max_ns: durations.max(),
            mean_ns: durations.mean(),
            stddev_ns: durations.stdev(),
            p50_ns: durations.value_at_percentile(50.0),
            p75_ns: durations.value_at_percentile(75.0),
            p95_ns: durations.value_at_percentile(95.0),
            p98_ns: durations.value_at_percentile(98.0),
            p99_ns: durations.value_at_percentile(99.0),
            p999_ns: durations.value_at_percentile(99.9),
            rate: self.rate.snapshot(),
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// In-flight timing context
pub struct StartedTimer {
    timer: Arc<Timer>,
    started_at: Instant,
}

impl StartedTimer {
    /// Record the elapsed time and return it
    pub fn stop(self) -> Duration {
        let elapsed = self.started_at.elapsed();
        self.timer.update(elapsed);
        elapsed
    }
}

/// Snapshot of timer state, durations in nanoseconds
#[derive(Debug, Clone)]
pub struct TimerSnapshot {
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub stddev_ns: f64,
    pub p50_ns: u64,
    pub p75_ns: u64,
    pub p95_ns: u64,
    pub p98_ns: u64,
    pub p99_ns: u64,
    pub p999_ns: u64,
    pub rate: MeterSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_update() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(200));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        // 3 significant figures keeps 200ms within 0.1%
        let mean_ms = snapshot.mean_ns / 1_000_000.0;
        assert!((199.0..=201.0).contains(&mean_ms), "mean {mean_ms}ms");
        assert_eq!(snapshot.rate.count, 1);
    }

    #[test]
    fn test_started_timer_records_on_stop() {
        let timer = Arc::new(Timer::new());
        let context = timer.start();
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = context.stop();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(timer.count(), 1);
    }

    #[test]
    fn test_time_closure() {
        let timer = Timer::new();
        let value = timer.time(|| 42);
        assert_eq!(value, 42);
        assert_eq!(timer.count(), 1);
    }
}

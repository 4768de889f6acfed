//! Throughput meter with moving-average rates

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Exponentially-weighted moving average over a fixed decay window
struct Ewma {
    alpha: f64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    /// EWMA decaying over the given number of minutes, ticked every 5s
    fn over_minutes(minutes: f64) -> Self {
        Self {
            alpha: 1.0 - (-TICK_INTERVAL.as_secs_f64() / 60.0 / minutes).exp(),
            rate: 0.0,
            initialized: false,
        }
    }

    fn tick(&mut self, instant_rate: f64) {
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }
}

struct MeterState {
    last_tick: Instant,
    uncounted: u64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

/// Event rate meter
///
/// Tracks a total count plus mean and 1/5/15-minute moving-average rates,
/// all in events per second. Rate conversion to the report's target unit
/// happens at collection time.
pub struct Meter {
    count: AtomicU64,
    start: Instant,
    state: Mutex<MeterState>,
}

impl Meter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            count: AtomicU64::new(0),
            start: now,
            state: Mutex::new(MeterState {
                last_tick: now,
                uncounted: 0,
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
            }),
        }
    }

    /// Record one event
    #[inline]
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Record n events
    pub fn mark_n(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
        let mut state = self.state.lock();
        Self::tick_if_necessary(&mut state);
        state.uncounted += n;
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean rate since creation, events per second
    pub fn mean_rate(&self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.count() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time rates
    pub fn snapshot(&self) -> MeterSnapshot {
        let mut state = self.state.lock();
        Self::tick_if_necessary(&mut state);
        MeterSnapshot {
            count: self.count(),
            mean_rate: self.mean_rate(),
            m1_rate: state.m1.rate,
            m5_rate: state.m5.rate,
            m15_rate: state.m15.rate,
        }
    }

    /// Advance the EWMAs by however many whole tick intervals have elapsed.
    /// The first elapsed interval consumes the uncounted events; the rest
    /// tick with an instant rate of zero.
    fn tick_if_necessary(state: &mut MeterState) {
        let elapsed = state.last_tick.elapsed();
        let ticks = (elapsed.as_nanos() / TICK_INTERVAL.as_nanos()) as u32;
        if ticks == 0 {
            return;
        }

        state.last_tick += TICK_INTERVAL * ticks;
        let instant_rate = state.uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        state.uncounted = 0;
        for i in 0..ticks {
            let rate = if i == 0 { instant_rate } else { 0.0 };
            state.m1.tick(rate);
            state.m5.tick(rate);
            state.m15.tick(rate);
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of meter state at a point in time, rates in events per second
#[derive(Debug, Clone)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean_rate: f64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
}

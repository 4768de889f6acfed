//! Time units for rate and duration conversion
//!
//! Meters track rates internally as events per second and timers track
//! durations as nanoseconds; reports convert both into the configured
//! target unit.

/// Target unit for converted rate and duration fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Nanoseconds in one unit
    pub fn as_nanos(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }

    /// Multiplier converting a nanosecond duration into this unit
    pub fn duration_factor(self) -> f64 {
        1.0 / self.as_nanos() as f64
    }

    /// Multiplier converting an events-per-second rate into events per
    /// this unit
    pub fn rate_factor(self) -> f64 {
        self.as_nanos() as f64 / 1_000_000_000.0
    }

    /// Short suffix for log output
    pub fn abbrev(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "m",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        }
    }
}

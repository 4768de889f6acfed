//! Destination index resolution

use std::fmt;

use chrono::{DateTime, Utc};

/// Destination index for one reporting cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTarget {
    pub base: String,
    /// Calendar partition suffix, absent for flat indices
    pub date_suffix: Option<String>,
}

impl IndexTarget {
    /// Full index name documents are written to
    pub fn resolved(&self) -> String {
        match &self.date_suffix {
            Some(suffix) => format!("{}-{}", self.base, suffix),
            None => self.base.clone(),
        }
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.date_suffix {
            Some(suffix) => write!(f, "{}-{}", self.base, suffix),
            None => f.write_str(&self.base),
        }
    }
}

/// Compute the destination index for an instant
///
/// Pure: the same instant and format always yield the same target, so
/// retries within a cycle land in the same index. An empty format
/// disables date partitioning.
pub fn resolve(base: &str, date_format: &str, now: DateTime<Utc>) -> IndexTarget {
    let date_suffix = if date_format.is_empty() {
        None
    } else {
        Some(now.format(date_format).to_string())
    };
    IndexTarget {
        base: base.to_string(),
        date_suffix,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Synthetic identity of a recorded sample.
///
/// Duration and timestamp are not unique on their own: two lookups finishing in
/// the same microsecond count with the same timestamp are distinct samples.
pub type SampleId = Uuid;

/// One timing observation of a similarity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSample {
    /// Unique sample identifier
    pub id: SampleId,
    /// Processing time of the lookup in microseconds
    pub duration_micros: u64,
    /// When the lookup request was received
    pub observed_at: DateTime<Utc>,
}

impl StatSample {
    /// Create a sample with a fresh identity.
    #[must_use]
    pub fn new(duration_micros: u64, observed_at: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), duration_micros, observed_at }
    }
}

/// Inclusive `[from, to]` timestamp range used to filter samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, or `None` unless `from` is strictly earlier than `to`.
    #[must_use]
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Self> {
        (from < to).then_some(Self { from, to })
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub const fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Whether `timestamp` lies inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from <= timestamp && timestamp <= self.to
    }
}

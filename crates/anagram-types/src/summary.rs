use serde::{Deserialize, Serialize};

/// Aggregate usage figures reported by the stats endpoint.
///
/// `avg_processing_time_micros` is serialized as `avgProcessingTimeMs` for
/// compatibility with existing clients, although the unit is microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Number of words currently in the dictionary
    pub total_words: u64,
    /// Number of recorded lookups in the selected range
    pub total_requests: u64,
    /// Mean lookup duration in microseconds, truncated; zero when there are no lookups
    #[serde(rename = "avgProcessingTimeMs")]
    pub avg_processing_time_micros: u64,
}

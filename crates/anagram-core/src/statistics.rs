//! Lookup timing statistics
//!
//! Samples are appended through a [`SampleStore`]; aggregation reads the
//! filtered set back and reduces it here, so every backend reports the same
//! figures.

use crate::error::CoreResult;
use crate::index::AnagramIndex;
use crate::store::SampleStore;
use anagram_types::{StatSample, StatsSummary, TimeWindow};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Request count and mean duration over a set of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleAggregate {
    pub count: u64,
    pub avg_duration_micros: u64,
}

impl SampleAggregate {
    /// Reduce `samples`; the mean is truncated toward zero and is zero for an empty set.
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a StatSample>,
    {
        let (count, total) = samples
            .into_iter()
            .fold((0u64, 0u128), |(count, total), sample| {
                (count + 1, total + u128::from(sample.duration_micros))
            });

        let avg_duration_micros = match count {
            0 => 0,
            // The mean of u64 values always fits in a u64.
            n => u64::try_from(total / u128::from(n)).unwrap_or(u64::MAX),
        };

        Self { count, avg_duration_micros }
    }
}

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    store: Arc<dyn SampleStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        Self { store }
    }

    /// Store one lookup timing.
    pub async fn record(&self, duration_micros: u64, observed_at: DateTime<Utc>) -> CoreResult<()> {
        let sample = StatSample::new(duration_micros, observed_at);
        self.store.record_sample(&sample).await?;
        debug!(sample_id = %sample.id, duration_micros, "Recorded lookup sample");
        Ok(())
    }

    /// Aggregate samples inside `window` (all samples when `None`).
    pub async fn aggregate_samples(&self, window: Option<&TimeWindow>) -> CoreResult<SampleAggregate> {
        let samples = self.store.fetch_samples(window).await?;
        Ok(SampleAggregate::from_samples(&samples))
    }

    /// Full report: dictionary size from `index` plus the sample aggregate.
    #[instrument(skip(self, index))]
    pub async fn aggregate(
        &self,
        index: &AnagramIndex,
        window: Option<TimeWindow>,
    ) -> CoreResult<StatsSummary> {
        let aggregate = self.aggregate_samples(window.as_ref()).await?;
        let total_words = index.total_word_count().await?;

        Ok(StatsSummary {
            total_words,
            total_requests: aggregate.count,
            avg_processing_time_micros: aggregate.avg_duration_micros,
        })
    }
}

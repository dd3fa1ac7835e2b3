//! Dictionary service: the policy layer above the index and the aggregator
//!
//! Inputs reaching this layer are assumed to be validated letter-only words.

use crate::error::{CoreError, CoreResult};
use crate::grouping::WordGroups;
use crate::index::{AnagramIndex, BulkLoadReport};
use crate::statistics::StatsAggregator;
use crate::store::Storage;
use anagram_types::{CanonicalKey, StatsSummary, TimeWindow};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct Dictionary {
    index: AnagramIndex,
    stats: StatsAggregator,
}

impl Dictionary {
    pub fn new(index: AnagramIndex, stats: StatsAggregator) -> Self {
        Self { index, stats }
    }

    /// Wire an index and aggregator onto `storage`.
    pub fn from_storage(storage: &Storage, bulk_load_batch_size: usize) -> Self {
        Self::new(
            AnagramIndex::new(storage.words.clone()).with_batch_size(bulk_load_batch_size),
            StatsAggregator::new(storage.samples.clone()),
        )
    }

    pub fn index(&self) -> &AnagramIndex {
        &self.index
    }

    /// Every other dictionary word sharing `word`'s letters.
    ///
    /// The query word itself is left out; an unknown key yields an empty list.
    #[instrument(skip(self))]
    pub async fn similar_words(&self, word: &str) -> CoreResult<Vec<String>> {
        let key = CanonicalKey::from_word(word);
        if !self.index.find_key(&key).await? {
            return Ok(Vec::new());
        }
        let mut words = self.index.get_words(&key).await?;
        words.retain(|candidate| candidate != word);
        Ok(words)
    }

    /// Add `word` unless that exact string is already present.
    ///
    /// The presence check and the insert are two separate storage calls, so two
    /// requests adding the same new word at the same moment can both succeed and
    /// leave a duplicate in the bucket. Inserts into the same key are otherwise
    /// atomic, so no word is ever lost.
    #[instrument(skip(self))]
    pub async fn add_word(&self, word: &str) -> CoreResult<()> {
        if self.index.find_word(word).await? {
            return Err(CoreError::word_exists(word));
        }
        let key = self.index.insert(word).await?;
        info!(%key, "Word added to dictionary");
        Ok(())
    }

    /// Record how long a similarity lookup took.
    pub async fn record_lookup(
        &self,
        duration_micros: u64,
        observed_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.stats.record(duration_micros, observed_at).await
    }

    /// Dictionary size plus lookup statistics, optionally restricted to `window`.
    pub async fn statistics(&self, window: Option<TimeWindow>) -> CoreResult<StatsSummary> {
        self.stats.aggregate(&self.index, window).await
    }

    /// Group `words` and bulk load them, replacing existing buckets.
    pub async fn load_words<I, S>(&self, words: I) -> CoreResult<BulkLoadReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.index.bulk_load(WordGroups::from_words(words)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DEFAULT_BULK_LOAD_BATCH_SIZE;

    fn dictionary() -> Dictionary {
        Dictionary::from_storage(&Storage::in_memory(), DEFAULT_BULK_LOAD_BATCH_SIZE)
    }

    #[tokio::test]
    async fn test_similar_words_excludes_query() {
        let dictionary = dictionary();
        dictionary.load_words(["post", "stop", "tops", "spot", "opts"]).await.unwrap();

        let similar = dictionary.similar_words("stop").await.unwrap();
        assert_eq!(similar, vec!["post", "tops", "spot", "opts"]);
    }

    #[tokio::test]
    async fn test_similar_words_for_word_not_in_dictionary() {
        let dictionary = dictionary();
        dictionary.load_words(["post", "stop"]).await.unwrap();

        assert_eq!(dictionary.similar_words("pots").await.unwrap(), vec!["post", "stop"]);
        assert!(dictionary.similar_words("xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_word_is_rejected() {
        let dictionary = dictionary();
        dictionary.add_word("cat").await.unwrap();

        let err = dictionary.add_word("cat").await.unwrap_err();
        assert!(matches!(err, CoreError::WordExists { ref word } if word == "cat"));
        assert_eq!(dictionary.index().total_word_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_case_variant_is_a_separate_word() {
        let dictionary = dictionary();
        dictionary.add_word("cat").await.unwrap();
        dictionary.add_word("Cat").await.unwrap();

        // Different exact strings, different keys: 'C' sorts apart from 'c'.
        assert!(dictionary.index().find_word("Cat").await.unwrap());
        assert_eq!(dictionary.similar_words("act").await.unwrap(), vec!["cat"]);
        assert_eq!(dictionary.similar_words("Cta").await.unwrap(), vec!["Cat"]);
    }
}

//! Anagram index: canonical key → bucket of words
//!
//! The index owns every bucket but keeps none of them in process memory; it
//! derives keys and delegates persistence to an injected [`WordStore`].

use crate::error::{CoreError, CoreResult};
use crate::grouping::WordGroups;
use crate::store::WordStore;
use anagram_types::CanonicalKey;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default number of keys written per bulk-load transaction
pub const DEFAULT_BULK_LOAD_BATCH_SIZE: usize = 10_000;

/// Outcome of a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkLoadReport {
    pub keys: usize,
    pub words: usize,
    pub batches: usize,
}

#[derive(Debug, Clone)]
pub struct AnagramIndex {
    store: Arc<dyn WordStore>,
    batch_size: usize,
}

impl AnagramIndex {
    pub fn new(store: Arc<dyn WordStore>) -> Self {
        Self { store, batch_size: DEFAULT_BULK_LOAD_BATCH_SIZE }
    }

    /// Use `batch_size` keys per bulk-load transaction (at least one).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Whether a bucket exists for `key`.
    pub async fn find_key(&self, key: &CanonicalKey) -> CoreResult<bool> {
        Ok(self.store.key_exists(key).await?)
    }

    /// Whether this exact word (same casing) is stored.
    pub async fn find_word(&self, word: &str) -> CoreResult<bool> {
        let key = CanonicalKey::from_word(word);
        Ok(self.store.word_exists(&key, word).await?)
    }

    /// Every word in the bucket for `key`, in insertion order.
    pub async fn get_words(&self, key: &CanonicalKey) -> CoreResult<Vec<String>> {
        self.store.fetch_words(key).await?.ok_or_else(|| CoreError::not_found(key.as_str()))
    }

    /// Append `word` to its bucket, creating the bucket on first use.
    #[instrument(skip(self), level = "debug")]
    pub async fn insert(&self, word: &str) -> CoreResult<CanonicalKey> {
        let key = CanonicalKey::from_word(word);
        self.store.append_word(&key, word).await?;
        debug!(%key, "Word appended to bucket");
        Ok(key)
    }

    /// Replace the bucket of every key in `groups`, one transaction per batch.
    ///
    /// Batches run sequentially. The first failing batch aborts the load; batches
    /// committed before it stay in place, which is safe because loading is an
    /// idempotent replace and can simply be retried.
    #[instrument(skip(self, groups), fields(keys = groups.key_count(), words = groups.word_count()))]
    pub async fn bulk_load(&self, groups: WordGroups) -> CoreResult<BulkLoadReport> {
        let mut report = BulkLoadReport::default();
        let batches = groups.into_batches(self.batch_size);
        let total_batches = batches.len();

        for (position, batch) in batches.into_iter().enumerate() {
            if let Err(e) = self.store.replace_buckets(&batch).await {
                warn!(
                    batch = position + 1,
                    total_batches,
                    error = %e,
                    "Bulk load batch rolled back"
                );
                return Err(e.into());
            }
            report.batches += 1;
            report.keys += batch.len();
            report.words += batch.iter().map(|(_, words)| words.len()).sum::<usize>();
            debug!(batch = position + 1, total_batches, "Bulk load batch committed");
        }

        info!(keys = report.keys, words = report.words, batches = report.batches, "Bulk load complete");
        Ok(report)
    }

    /// Total number of words across all buckets.
    pub async fn total_word_count(&self) -> CoreResult<u64> {
        Ok(self.store.total_words().await?)
    }

    /// Round trip to the backing store.
    pub async fn ping(&self) -> CoreResult<()> {
        Ok(self.store.ping().await?)
    }
}

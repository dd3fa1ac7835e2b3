use super::{BucketEntry, SampleStore, WordStore};
use crate::error::StoreResult;
use anagram_types::{CanonicalKey, SampleId, StatSample, TimeWindow};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-process storage backed by `dashmap`.
///
/// Used by tests and by the `memory` storage backend. Nothing survives a
/// restart. Appends go through the shard-locked entry API, so concurrent
/// inserts into the same bucket are never lost.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: DashMap<CanonicalKey, Vec<String>>,
    samples: DashMap<SampleId, StatSample>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets currently stored.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of samples currently stored.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn key_exists(&self, key: &CanonicalKey) -> StoreResult<bool> {
        Ok(self.buckets.contains_key(key))
    }

    async fn word_exists(&self, key: &CanonicalKey, word: &str) -> StoreResult<bool> {
        Ok(self.buckets.get(key).is_some_and(|bucket| bucket.iter().any(|w| w == word)))
    }

    async fn fetch_words(&self, key: &CanonicalKey) -> StoreResult<Option<Vec<String>>> {
        Ok(self.buckets.get(key).map(|bucket| bucket.clone()))
    }

    async fn append_word(&self, key: &CanonicalKey, word: &str) -> StoreResult<()> {
        self.buckets.entry(key.clone()).or_default().push(word.to_string());
        Ok(())
    }

    async fn replace_buckets(&self, batch: &[BucketEntry]) -> StoreResult<()> {
        // Inserting into a map cannot fail part-way, so the batch is all-or-nothing.
        for (key, words) in batch {
            if words.is_empty() {
                self.buckets.remove(key);
            } else {
                self.buckets.insert(key.clone(), words.clone());
            }
        }
        Ok(())
    }

    async fn total_words(&self) -> StoreResult<u64> {
        Ok(self.buckets.iter().map(|bucket| bucket.len() as u64).sum())
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn record_sample(&self, sample: &StatSample) -> StoreResult<()> {
        self.samples.insert(sample.id, sample.clone());
        Ok(())
    }

    async fn fetch_samples(&self, window: Option<&TimeWindow>) -> StoreResult<Vec<StatSample>> {
        Ok(self
            .samples
            .iter()
            .filter(|entry| window.is_none_or(|w| w.contains(entry.observed_at)))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

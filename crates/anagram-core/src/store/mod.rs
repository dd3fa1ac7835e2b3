//! Storage collaborators for the anagram index and the statistics aggregator
//!
//! The core never talks to a database directly. It depends on the two traits
//! below, and the process entry point decides which backend to construct and
//! inject.

use crate::error::StoreResult;
use anagram_types::{CanonicalKey, StatSample, TimeWindow};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresStore, PostgresStoreConfig};

/// One key and the full bucket that should be stored under it.
pub type BucketEntry = (CanonicalKey, Vec<String>);

/// Persistence for the key → bucket mapping.
#[async_trait]
pub trait WordStore: Send + Sync + std::fmt::Debug {
    /// Whether a bucket exists for `key`.
    async fn key_exists(&self, key: &CanonicalKey) -> StoreResult<bool>;

    /// Whether the exact `word` is stored in the bucket for `key`.
    async fn word_exists(&self, key: &CanonicalKey, word: &str) -> StoreResult<bool>;

    /// The bucket for `key`, or `None` if there is none.
    async fn fetch_words(&self, key: &CanonicalKey) -> StoreResult<Option<Vec<String>>>;

    /// Append `word` to the bucket for `key`, creating the bucket if absent.
    ///
    /// Implementations must do this as a single atomic upsert.
    async fn append_word(&self, key: &CanonicalKey, word: &str) -> StoreResult<()>;

    /// Replace the buckets of every key in `batch`.
    ///
    /// Either the whole batch is applied or none of it is.
    async fn replace_buckets(&self, batch: &[BucketEntry]) -> StoreResult<()>;

    /// Sum of all bucket sizes.
    async fn total_words(&self) -> StoreResult<u64>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Release backend resources on shutdown.
    async fn close(&self) {}
}

/// Append-only persistence for lookup timing samples.
#[async_trait]
pub trait SampleStore: Send + Sync + std::fmt::Debug {
    /// Persist one sample.
    async fn record_sample(&self, sample: &StatSample) -> StoreResult<()>;

    /// All samples, or only those observed inside `window`.
    async fn fetch_samples(&self, window: Option<&TimeWindow>) -> StoreResult<Vec<StatSample>>;
}

/// Handles to the word and sample stores, shared across the process.
#[derive(Debug, Clone)]
pub struct Storage {
    pub words: Arc<dyn WordStore>,
    pub samples: Arc<dyn SampleStore>,
}

impl Storage {
    /// Use one backend for both words and samples.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: WordStore + SampleStore + 'static,
    {
        Self { words: store.clone(), samples: store }
    }

    /// Fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }

    /// Close the word store's backend. Shared backends close once for both handles.
    pub async fn close(&self) {
        self.words.close().await;
    }
}

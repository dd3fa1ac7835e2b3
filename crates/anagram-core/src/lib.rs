//! Core functionality for the anagram dictionary service.
//!
//! This crate groups words by canonical key, maintains the key → bucket index on
//! top of a pluggable store, and aggregates lookup timing statistics.

/// Dictionary service combining the index and the statistics aggregator
pub mod dictionary;
/// Error types for core and storage operations
pub mod error;
/// Single-pass grouping of word lists into anagram buckets
pub mod grouping;
/// Anagram index over a word store
pub mod index;
/// Seeding from newline-delimited word lists
pub mod seed;
/// Lookup timing samples and their aggregation
pub mod statistics;
/// Storage traits and backends
pub mod store;

pub use anagram_types::{CanonicalKey, StatSample, StatsSummary, TimeWindow};
pub use dictionary::Dictionary;
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use grouping::WordGroups;
pub use index::{AnagramIndex, BulkLoadReport, DEFAULT_BULK_LOAD_BATCH_SIZE};
pub use statistics::{SampleAggregate, StatsAggregator};
pub use store::{MemoryStore, SampleStore, Storage, WordStore};

//! Anagram Types
//!
//! This crate defines the shared types used throughout the anagram dictionary
//! workspace (currently `anagram-core` and `anagram-api`). Keeping them here lets
//! the storage backends and the HTTP layer agree on keys, samples and summaries
//! without depending on each other.

#![warn(missing_docs)]

mod key;
mod sample;
mod summary;

pub use key::CanonicalKey;
pub use sample::{SampleId, StatSample, TimeWindow};
pub use summary::StatsSummary;

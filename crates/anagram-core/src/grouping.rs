//! Grouping of a flat word list into anagram buckets
//!
//! One linear pass: each word's key is computed once and the word is appended
//! to that key's bucket, the first occurrence of a key creating the bucket.

use crate::store::BucketEntry;
use ahash::AHashMap;
use anagram_types::CanonicalKey;

/// Words grouped by canonical key, ready for a bulk load.
#[derive(Debug, Clone, Default)]
pub struct WordGroups {
    buckets: AHashMap<CanonicalKey, Vec<String>>,
    word_count: usize,
}

impl WordGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `words`, skipping blank entries. Surrounding whitespace is trimmed.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups = Self::new();
        for word in words {
            groups.push(word.as_ref());
        }
        groups
    }

    /// Add a single word to its bucket.
    pub fn push(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.buckets.entry(CanonicalKey::from_word(word)).or_default().push(word.to_string());
        self.word_count += 1;
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of grouped words, duplicates included.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The bucket for `key`, if any word produced it.
    pub fn get(&self, key: &CanonicalKey) -> Option<&[String]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Split into batches of at most `batch_size` keys (a size of zero is treated as one).
    pub fn into_batches(self, batch_size: usize) -> Vec<Vec<BucketEntry>> {
        let batch_size = batch_size.max(1);
        let mut batches = Vec::with_capacity(self.buckets.len().div_ceil(batch_size));
        let mut current = Vec::with_capacity(batch_size.min(self.buckets.len()));

        for entry in self.buckets {
            current.push(entry);
            if current.len() == batch_size {
                batches.push(std::mem::replace(&mut current, Vec::with_capacity(batch_size)));
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordGroups {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_words(iter)
    }
}

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The letters of a word sorted into ascending character-code order.
///
/// Two words are anagrams of each other exactly when they share a key. Sorting is
/// case-sensitive: `"Tea"` and `"eat"` produce different keys because `'T'` and
/// `'t'` are different characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Build the key for `word`.
    ///
    /// The input is expected to be validated already; this never fails and does not
    /// inspect the characters beyond sorting them.
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        let mut chars: Vec<char> = word.chars().collect();
        chars.sort_unstable();
        Self(chars.into_iter().collect())
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

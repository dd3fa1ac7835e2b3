//! Seeding the dictionary from a newline-delimited word list

use crate::dictionary::Dictionary;
use crate::error::{CoreError, CoreResult};
use crate::index::BulkLoadReport;
use std::path::Path;
use tracing::{info, instrument};

/// Read a word list with one word per line (`\n` or `\r\n`), dropping blank lines.
pub async fn read_word_list(path: &Path) -> CoreResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CoreError::WordList { path: path.to_path_buf(), source })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Bulk load the word list at `path`, replacing the buckets it touches.
#[instrument(skip(dictionary))]
pub async fn seed_from_file(dictionary: &Dictionary, path: &Path) -> CoreResult<BulkLoadReport> {
    let words = read_word_list(path).await?;
    info!(words = words.len(), "Seeding dictionary from word list");
    dictionary.load_words(&words).await
}

/// Seed from `path` only when the dictionary holds no words yet.
///
/// Returns `None` when the dictionary was already populated.
pub async fn seed_if_empty(
    dictionary: &Dictionary,
    path: &Path,
) -> CoreResult<Option<BulkLoadReport>> {
    let existing = dictionary.index().total_word_count().await?;
    if existing > 0 {
        info!(existing, "Dictionary already populated, skipping seed");
        return Ok(None);
    }
    seed_from_file(dictionary, path).await.map(Some)
}

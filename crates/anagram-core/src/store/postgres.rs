//! PostgreSQL storage backend
//!
//! Buckets live in `words(key, words_list TEXT[])` and samples in
//! `stats(id, request_duration, observed_at)`. Every statement borrows a
//! connection from the pool for its own duration only, and every call is
//! bounded by `call_timeout`.

use super::{BucketEntry, SampleStore, WordStore};
use crate::error::{StoreError, StoreResult};
use anagram_types::{CanonicalKey, StatSample, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Upper bound on keys per bulk statement; two binds per key must stay under
/// PostgreSQL's 65 535 parameter limit.
pub const MAX_KEYS_PER_STATEMENT: usize = 30_000;

const CREATE_WORDS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        key TEXT PRIMARY KEY,
        words_list TEXT[] NOT NULL
    )
"#;

const CREATE_STATS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS stats (
        id UUID PRIMARY KEY,
        request_duration BIGINT NOT NULL CHECK (request_duration >= 0),
        observed_at TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_STATS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS stats_observed_at_idx ON stats (observed_at)";

/// Connection settings for [`PostgresStore`]
#[derive(Debug, Clone)]
pub struct PostgresStoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub call_timeout: Duration,
}

impl PostgresStoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(5),
        }
    }
}

/// Word and sample storage in PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    call_timeout: Duration,
}

#[derive(sqlx::FromRow)]
struct SampleRow {
    id: Uuid,
    request_duration: i64,
    observed_at: DateTime<Utc>,
}

impl TryFrom<SampleRow> for StatSample {
    type Error = StoreError;

    fn try_from(row: SampleRow) -> StoreResult<Self> {
        let duration_micros = u64::try_from(row.request_duration).map_err(|_| {
            StoreError::OutOfRange {
                operation: "fetch_samples",
                message: format!("negative request_duration {}", row.request_duration),
            }
        })?;
        Ok(StatSample { id: row.id, duration_micros, observed_at: row.observed_at })
    }
}

impl PostgresStore {
    /// Open a lazily-connecting pool; no connection is made until first use.
    pub fn connect_lazy(config: &PostgresStoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.database_url)
            .map_err(|e| StoreError::backend("connect", e))?;
        Ok(Self::from_pool(pool, config.call_timeout))
    }

    /// Open a pool and verify the database is reachable.
    pub async fn connect(config: &PostgresStoreConfig) -> StoreResult<Self> {
        let store = Self::connect_lazy(config)?;
        store.ping().await?;
        info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(store)
    }

    pub fn from_pool(pool: PgPool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }

    /// Create the `words` and `stats` tables if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in [CREATE_WORDS_TABLE, CREATE_STATS_TABLE, CREATE_STATS_INDEX] {
            self.bounded("migrate", sqlx::query(statement).execute(&self.pool))
                .await
                .map_err(|e| StoreError::Schema { message: e.to_string() })?;
        }
        debug!("Storage schema is up to date");
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(sqlx::Error::PoolTimedOut)) => {
                Err(StoreError::Timeout { operation, after: self.call_timeout })
            }
            Ok(Err(e)) => Err(StoreError::backend(operation, e)),
            Err(_) => Err(StoreError::Timeout { operation, after: self.call_timeout }),
        }
    }

    async fn replace_in_transaction(&self, batch: &[BucketEntry]) -> Result<(), sqlx::Error> {
        let (filled, emptied) = split_batch(batch);
        let mut tx = self.pool.begin().await?;

        if !emptied.is_empty() {
            sqlx::query("DELETE FROM words WHERE key = ANY($1)")
                .bind(emptied)
                .execute(&mut *tx)
                .await?;
        }
        if !filled.is_empty() {
            let mut builder: QueryBuilder<'_, Postgres> =
                QueryBuilder::new("INSERT INTO words (key, words_list) ");
            builder.push_values(filled, |mut row, (key, words)| {
                row.push_bind(key.as_str().to_owned()).push_bind(words.clone());
            });
            builder.push(" ON CONFLICT (key) DO UPDATE SET words_list = EXCLUDED.words_list");
            builder.build().execute(&mut *tx).await?;
        }

        // Dropping `tx` on any earlier `?` rolls the batch back.
        tx.commit().await
    }
}

/// Separate entries to upsert from keys whose bucket is now empty and must be deleted.
fn split_batch(batch: &[BucketEntry]) -> (Vec<&BucketEntry>, Vec<String>) {
    let (filled, emptied): (Vec<&BucketEntry>, Vec<&BucketEntry>) =
        batch.iter().partition(|(_, words)| !words.is_empty());
    let emptied = emptied.into_iter().map(|(key, _)| key.as_str().to_owned()).collect();
    (filled, emptied)
}

#[async_trait]
impl WordStore for PostgresStore {
    async fn key_exists(&self, key: &CanonicalKey) -> StoreResult<bool> {
        let query = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM words WHERE key = $1)",
        )
        .bind(key.as_str())
        .fetch_one(&self.pool);
        self.bounded("key_exists", query).await
    }

    async fn word_exists(&self, key: &CanonicalKey, word: &str) -> StoreResult<bool> {
        let query = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM words WHERE key = $1 AND $2 = ANY(words_list))",
        )
        .bind(key.as_str())
        .bind(word)
        .fetch_one(&self.pool);
        self.bounded("word_exists", query).await
    }

    async fn fetch_words(&self, key: &CanonicalKey) -> StoreResult<Option<Vec<String>>> {
        let query =
            sqlx::query_scalar::<_, Vec<String>>("SELECT words_list FROM words WHERE key = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool);
        self.bounded("fetch_words", query).await
    }

    async fn append_word(&self, key: &CanonicalKey, word: &str) -> StoreResult<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO words (key, words_list) VALUES ($1, ARRAY[$2::TEXT])
            ON CONFLICT (key) DO UPDATE
                SET words_list = array_append(words.words_list, $2::TEXT)
            "#,
        )
        .bind(key.as_str())
        .bind(word)
        .execute(&self.pool);
        self.bounded("append_word", query).await?;
        Ok(())
    }

    async fn replace_buckets(&self, batch: &[BucketEntry]) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > MAX_KEYS_PER_STATEMENT {
            return Err(StoreError::OutOfRange {
                operation: "replace_buckets",
                message: format!(
                    "batch of {} keys exceeds the limit of {}",
                    batch.len(),
                    MAX_KEYS_PER_STATEMENT
                ),
            });
        }
        self.bounded("replace_buckets", self.replace_in_transaction(batch)).await
    }

    async fn total_words(&self) -> StoreResult<u64> {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(cardinality(words_list)), 0)::BIGINT FROM words",
        )
        .fetch_one(&self.pool);
        let total = self.bounded("total_words", query).await?;
        u64::try_from(total).map_err(|_| StoreError::OutOfRange {
            operation: "total_words",
            message: format!("negative word count {total}"),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        self.bounded("ping", query).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl SampleStore for PostgresStore {
    async fn record_sample(&self, sample: &StatSample) -> StoreResult<()> {
        let duration = i64::try_from(sample.duration_micros).map_err(|_| {
            StoreError::OutOfRange {
                operation: "record_sample",
                message: format!("duration {} does not fit BIGINT", sample.duration_micros),
            }
        })?;
        let query = sqlx::query(
            "INSERT INTO stats (id, request_duration, observed_at) VALUES ($1, $2, $3)",
        )
        .bind(sample.id)
        .bind(duration)
        .bind(sample.observed_at)
        .execute(&self.pool);
        self.bounded("record_sample", query).await?;
        Ok(())
    }

    async fn fetch_samples(&self, window: Option<&TimeWindow>) -> StoreResult<Vec<StatSample>> {
        let rows = match window {
            Some(window) => {
                let query = sqlx::query_as::<_, SampleRow>(
                    r#"
                    SELECT id, request_duration, observed_at FROM stats
                    WHERE observed_at >= $1 AND observed_at <= $2
                    "#,
                )
                .bind(window.from())
                .bind(window.to())
                .fetch_all(&self.pool);
                self.bounded("fetch_samples", query).await?
            }
            None => {
                let query = sqlx::query_as::<_, SampleRow>(
                    "SELECT id, request_duration, observed_at FROM stats",
                )
                .fetch_all(&self.pool);
                self.bounded("fetch_samples", query).await?
            }
        };
        rows.into_iter().map(StatSample::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buckets_become_deletes() {
        let batch = vec![
            (CanonicalKey::from_word("cat"), vec!["cat".to_string(), "act".to_string()]),
            (CanonicalKey::from_word("owl"), Vec::new()),
            (CanonicalKey::from_word("dog"), vec!["dog".to_string()]),
        ];

        let (filled, emptied) = split_batch(&batch);
        assert_eq!(filled, vec![&batch[0], &batch[2]]);
        assert_eq!(emptied, vec!["low".to_string()]);
    }

    #[test]
    fn test_batch_without_empty_buckets_deletes_nothing() {
        let batch = vec![(CanonicalKey::from_word("tops"), vec!["stop".to_string()])];
        let (filled, emptied) = split_batch(&batch);
        assert_eq!(filled.len(), 1);
        assert!(emptied.is_empty());
    }
}

//! Anagram dictionary HTTP API
//!
//! Axum application serving similarity lookups, word insertion and usage
//! statistics on top of [`anagram_core::Dictionary`].

use std::sync::Arc;
use std::time::Duration;

use anagram_core::{Dictionary, Storage};
use axum::Router;
use chrono::{DateTime, Utc};
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod tracing_setup;
pub mod validation;

use config::{AnagramConfig, StorageBackend, StorageConfig};

/// Shared application state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub start_time: DateTime<Utc>,
    pub dictionary: Arc<Dictionary>,
}

impl AppState {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { start_time: Utc::now(), dictionary: Arc::new(dictionary) }
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.start_time).to_std().unwrap_or_default()
    }
}

/// Build the axum application for `state`.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    routes::router(state, request_timeout)
}

/// Construct the configured storage backend.
///
/// The PostgreSQL backend is connected, pinged and migrated before it is returned.
pub async fn build_storage(config: &StorageConfig) -> anyhow::Result<Storage> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Storage::in_memory())
        }
        StorageBackend::Postgres => connect_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(config: &StorageConfig) -> anyhow::Result<Storage> {
    use anagram_core::store::{PostgresStore, PostgresStoreConfig};
    use anyhow::Context;

    let url = config.database_url.as_deref().context("storage.database_url is not set")?;
    let store_config = PostgresStoreConfig {
        database_url: url.to_string(),
        max_connections: config.max_connections,
        acquire_timeout: Duration::from_secs(config.acquire_timeout_seconds),
        call_timeout: Duration::from_millis(config.call_timeout_ms),
    };
    let store = PostgresStore::connect(&store_config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store.migrate().await.context("Failed to create database schema")?;
    Ok(Storage::shared(Arc::new(store)))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_config: &StorageConfig) -> anyhow::Result<Storage> {
    anyhow::bail!("this build does not include the PostgreSQL backend")
}

/// Build the dictionary service for `config` on `storage`.
pub fn build_dictionary(config: &AnagramConfig, storage: &Storage) -> Dictionary {
    Dictionary::from_storage(storage, config.dictionary.bulk_load_batch_size)
}

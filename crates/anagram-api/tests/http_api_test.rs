//! End-to-end HTTP tests against in-memory storage.

use anagram_api::error::ApiErrorResponse;
use anagram_api::routes::anagrams::SimilarResponse;
use anagram_api::routes::health::HealthResponse;
use anagram_api::{AppState, create_app};
use anagram_core::store::BucketEntry;
use anagram_core::{
    CanonicalKey, Dictionary, MemoryStore, Storage, StoreError, StoreResult, WordStore,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

async fn create_test_server(words: &[&str]) -> TestServer {
    let dictionary = Dictionary::from_storage(&Storage::in_memory(), 1_000);
    dictionary.load_words(words).await.expect("Failed to load words");
    server_for(dictionary)
}

fn server_for(dictionary: Dictionary) -> TestServer {
    let app = create_app(AppState::new(dictionary), Duration::from_secs(5));
    TestServer::new(app).expect("Failed to create test server")
}

fn assert_error(body: ApiErrorResponse, error_type: &str) {
    assert_eq!(body.error_type, error_type, "unexpected error body: {body:?}");
    assert!(!body.error.is_empty());
}

/// Word store whose backend never answers in time.
#[derive(Debug)]
struct UnavailableWordStore;

impl UnavailableWordStore {
    fn timeout(operation: &'static str) -> StoreError {
        StoreError::Timeout { operation, after: Duration::from_millis(10) }
    }
}

#[async_trait]
impl WordStore for UnavailableWordStore {
    async fn key_exists(&self, _key: &CanonicalKey) -> StoreResult<bool> {
        Err(Self::timeout("key_exists"))
    }

    async fn word_exists(&self, _key: &CanonicalKey, _word: &str) -> StoreResult<bool> {
        Err(Self::timeout("word_exists"))
    }

    async fn fetch_words(&self, _key: &CanonicalKey) -> StoreResult<Option<Vec<String>>> {
        Err(Self::timeout("fetch_words"))
    }

    async fn append_word(&self, _key: &CanonicalKey, _word: &str) -> StoreResult<()> {
        Err(Self::timeout("append_word"))
    }

    async fn replace_buckets(&self, _batch: &[BucketEntry]) -> StoreResult<()> {
        Err(Self::timeout("replace_buckets"))
    }

    async fn total_words(&self) -> StoreResult<u64> {
        Err(Self::timeout("total_words"))
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(Self::timeout("ping"))
    }
}

/// Word store that answers correctly, but only after `delay`.
#[derive(Debug)]
struct SlowWordStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl WordStore for SlowWordStore {
    async fn key_exists(&self, key: &CanonicalKey) -> StoreResult<bool> {
        tokio::time::sleep(self.delay).await;
        self.inner.key_exists(key).await
    }

    async fn word_exists(&self, key: &CanonicalKey, word: &str) -> StoreResult<bool> {
        tokio::time::sleep(self.delay).await;
        self.inner.word_exists(key, word).await
    }

    async fn fetch_words(&self, key: &CanonicalKey) -> StoreResult<Option<Vec<String>>> {
        self.inner.fetch_words(key).await
    }

    async fn append_word(&self, key: &CanonicalKey, word: &str) -> StoreResult<()> {
        self.inner.append_word(key, word).await
    }

    async fn replace_buckets(&self, batch: &[BucketEntry]) -> StoreResult<()> {
        self.inner.replace_buckets(batch).await
    }

    async fn total_words(&self) -> StoreResult<u64> {
        self.inner.total_words().await
    }
}

fn unavailable_server() -> TestServer {
    let storage =
        Storage { words: Arc::new(UnavailableWordStore), samples: Arc::new(MemoryStore::new()) };
    server_for(Dictionary::from_storage(&storage, 1_000))
}

#[tokio::test]
async fn test_similar_returns_other_anagrams() {
    let server = create_test_server(&["post", "stop", "tops", "spot", "dog"]).await;

    let response = server.get("/api/v1/similar").add_query_param("word", "stop").await;
    response.assert_status_ok();
    let body: SimilarResponse = response.json();
    assert_eq!(body.similar, vec!["post", "tops", "spot"]);
}

#[tokio::test]
async fn test_similar_unknown_word_is_empty() {
    let server = create_test_server(&["post", "stop"]).await;

    let response = server.get("/api/v1/similar").add_query_param("word", "zebra").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"similar": []}));
}

#[tokio::test]
async fn test_similar_rejects_missing_or_invalid_word() {
    let server = create_test_server(&["post"]).await;

    let missing = server.get("/api/v1/similar").await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_error(missing.json(), "Validation");

    let invalid = server.get("/api/v1/similar").add_query_param("word", "po5t").await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
    assert_error(invalid.json(), "Validation");
}

#[tokio::test]
async fn test_add_word_then_lookup() {
    let server = create_test_server(&["listen"]).await;

    let response = server.post("/api/v1/add-word").json(&json!({"word": "silent"})).await;
    response.assert_status_ok();
    assert_eq!(response.text(), "silent added to the dictionary successfully!");

    let similar: SimilarResponse =
        server.get("/api/v1/similar").add_query_param("word", "enlist").await.json();
    assert_eq!(similar.similar, vec!["listen", "silent"]);
}

#[tokio::test]
async fn test_add_duplicate_word_is_rejected() {
    let server = create_test_server(&["cat"]).await;

    let response = server.post("/api/v1/add-word").json(&json!({"word": "cat"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ApiErrorResponse = response.json();
    assert_eq!(body.error_type, "Word exists");
    assert_eq!(body.error, "The word: cat is already in the dictionary.");

    // A different casing is a different word.
    server.post("/api/v1/add-word").json(&json!({"word": "Cat"})).await.assert_status_ok();
}

#[tokio::test]
async fn test_add_word_rejects_bad_bodies() {
    let server = create_test_server(&[]).await;

    let cases = [
        server.post("/api/v1/add-word").json(&json!({})).await,
        server.post("/api/v1/add-word").json(&json!({"word": "two words"})).await,
        server.post("/api/v1/add-word").json(&json!({"word": 42})).await,
        server.post("/api/v1/add-word").text("not json").await,
    ];
    for response in cases {
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_error(response.json(), "Validation");
    }
}

#[tokio::test]
async fn test_stats_counts_lookups() {
    let server = create_test_server(&["post", "stop", "dog"]).await;

    server.get("/api/v1/similar").add_query_param("word", "stop").await.assert_status_ok();
    server.get("/api/v1/similar").add_query_param("word", "cat").await.assert_status_ok();
    // Rejected lookups record nothing.
    server.get("/api/v1/similar").await.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/api/v1/stats").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["totalWords"], 3);
    assert_eq!(body["totalRequests"], 2);
    assert!(body["avgProcessingTimeMs"].is_u64());
}

#[tokio::test]
async fn test_stats_window_excludes_other_times() {
    let server = create_test_server(&["post"]).await;
    server.get("/api/v1/similar").add_query_param("word", "post").await.assert_status_ok();

    let response = server
        .get("/api/v1/stats")
        .add_query_param("from", "2000-01-01T00:00:00")
        .add_query_param("to", "2000-01-02T00:00:00")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"totalWords": 1, "totalRequests": 0, "avgProcessingTimeMs": 0})
    );
}

#[tokio::test]
async fn test_stats_rejects_invalid_ranges() {
    let server = create_test_server(&[]).await;

    let only_from = server.get("/api/v1/stats").add_query_param("from", "2024-01-02T00:00:00").await;
    only_from.assert_status(StatusCode::BAD_REQUEST);
    assert_error(only_from.json(), "Validation");

    let reversed = server
        .get("/api/v1/stats")
        .add_query_param("from", "2024-01-03T00:00:00")
        .add_query_param("to", "2024-01-02T00:00:00")
        .await;
    reversed.assert_status(StatusCode::BAD_REQUEST);
    assert_error(reversed.json(), "Validation");

    let malformed = server
        .get("/api/v1/stats")
        .add_query_param("from", "yesterday")
        .add_query_param("to", "2024-01-02T00:00:00")
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    assert_error(malformed.json(), "Validation");
}

#[tokio::test]
async fn test_health_reports_storage() {
    let server = create_test_server(&[]).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.storage, "ok");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_storage_failures_are_reported() {
    let server = unavailable_server();

    let similar = server.get("/api/v1/similar").add_query_param("word", "stop").await;
    similar.assert_status(StatusCode::BAD_REQUEST);
    assert_error(similar.json(), "Storage");

    let add = server.post("/api/v1/add-word").json(&json!({"word": "stop"})).await;
    add.assert_status(StatusCode::BAD_REQUEST);
    assert_error(add.json(), "Storage");

    let stats = server.get("/api/v1/stats").await;
    stats.assert_status(StatusCode::BAD_REQUEST);
    assert_error(stats.json(), "Storage");

    let health = server.get("/health").await;
    health.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.json::<HealthResponse>().status, "unhealthy");
}

#[tokio::test]
async fn test_request_timeout_is_a_storage_error() {
    let words = SlowWordStore { inner: MemoryStore::new(), delay: Duration::from_millis(300) };
    let storage = Storage { words: Arc::new(words), samples: Arc::new(MemoryStore::new()) };
    let app = create_app(
        AppState::new(Dictionary::from_storage(&storage, 1_000)),
        Duration::from_millis(100),
    );
    let server = TestServer::new(app).expect("Failed to create test server");

    let similar = server.get("/api/v1/similar").add_query_param("word", "stop").await;
    similar.assert_status(StatusCode::BAD_REQUEST);
    assert_error(similar.json(), "Storage");

    let add = server.post("/api/v1/add-word").json(&json!({"word": "stop"})).await;
    add.assert_status(StatusCode::BAD_REQUEST);
    assert_error(add.json(), "Storage");

    // Routes that skip the slow calls still answer.
    server.get("/api/v1/stats").await.assert_status_ok();
}

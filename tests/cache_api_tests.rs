//! Integration tests for the cache service API
//!
//! Drives the full router, including write-through and fallback populate
//! against a live in-process store service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use minikv::api::{create_cache_router, create_store_router, RateLimiter, StoreState};
use minikv::cache::CacheEngine;
use minikv::client::StorageClient;
use minikv::store::{PartitionedStore, StoreManager};
use minikv::CacheState;

// == Helper Functions ==

fn cache_app_with_storage(storage: StorageClient) -> Router {
    let state = CacheState::new(CacheEngine::new(100, 300), storage);
    create_cache_router(state, Arc::new(RateLimiter::new(100_000, 60_000)))
}

fn cache_app() -> Router {
    let storage = StorageClient::new("http://192.0.2.1:1");
    storage.disable();
    cache_app_with_storage(storage)
}

/// Serves a real store service on an ephemeral port and returns its URL.
async fn spawn_store_service(data_path: &std::path::Path) -> String {
    let store = PartitionedStore::new(data_path);
    store.initialize().await.unwrap();
    let state = StoreState::new(StoreManager::new(store), 10 * 1024 * 1024);
    let app = create_store_router(state, Arc::new(RateLimiter::new(100_000, 60_000)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_key(payload: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/keys")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get_uri(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// == Set / Get ==

#[tokio::test]
async fn test_set_then_get() {
    let app = cache_app();

    let response = app
        .clone()
        .oneshot(post_key(r#"{"key":"greeting","value":{"text":"hello"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["key"], json!("greeting"));

    let response = app.oneshot(get_uri("/api/keys/greeting")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["value"], json!({"text": "hello"}));
}

#[tokio::test]
async fn test_get_missing_returns_envelope_error() {
    let response = cache_app().oneshot(get_uri("/api/keys/ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_set_rejects_empty_key() {
    let response = cache_app()
        .oneshot(post_key(r#"{"key":"","value":1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_set_rejects_malformed_json() {
    let response = cache_app()
        .oneshot(post_key(r#"{"key": broken"#))
        .await
        .unwrap();
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

// == Update ==

#[tokio::test]
async fn test_update_value_and_ttl() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"k","value":1}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/keys/k")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"value":2,"ttl":0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_uri("/api/keys/k")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["value"], json!(2));
}

#[tokio::test]
async fn test_update_missing_key_is_404() {
    let response = cache_app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/keys/ghost")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"value":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_empty_body_is_400() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"k","value":1}"#))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/keys/k")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Delete / List / Clear ==

#[tokio::test]
async fn test_delete_then_get_is_404() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"k","value":1}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/keys/k")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_uri("/api/keys/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_keys_and_count() {
    let app = cache_app();
    for key in ["a", "b", "c"] {
        app.clone()
            .oneshot(post_key(&format!(r#"{{"key":"{}","value":1}}"#, key)))
            .await
            .unwrap();
    }

    let response = app.oneshot(get_uri("/api/keys")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["count"], json!(3));
    let mut keys: Vec<String> = body["data"]["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap().to_string())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_clear_cache() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"k","value":1}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_uri("/api/keys")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["count"], json!(0));
}

// == Stats / Health ==

#[tokio::test]
async fn test_stats_reflect_hits_and_misses() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"k","value":1}"#))
        .await
        .unwrap();

    app.clone().oneshot(get_uri("/api/keys/k")).await.unwrap();
    app.clone()
        .oneshot(get_uri("/api/keys/ghost"))
        .await
        .unwrap();

    let response = app.oneshot(get_uri("/api/stats")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["hits"], json!(1));
    assert_eq!(body["data"]["misses"], json!(1));
    assert_eq!(body["data"]["hitRate"], json!(50.0));
    assert_eq!(body["data"]["size"], json!(1));
}

#[tokio::test]
async fn test_health_reports_size_and_uptime() {
    let response = cache_app().oneshot(get_uri("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["status"], json!("healthy"));
    assert_eq!(body["data"]["maxSize"], json!(100));
    assert!(body["data"]["uptimeSeconds"].is_u64());
}

// == TTL via API ==

#[tokio::test]
async fn test_ttl_expiry_via_api() {
    let app = cache_app();
    app.clone()
        .oneshot(post_key(r#"{"key":"fleeting","value":"gone soon","ttl":1}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_uri("/api/keys/fleeting"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app.oneshot(get_uri("/api/keys/fleeting")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Write-through and Fallback Populate ==

#[tokio::test]
async fn test_write_through_then_fallback_populate() {
    let dir = tempfile::tempdir().unwrap();
    let store_url = spawn_store_service(dir.path()).await;
    let app = cache_app_with_storage(StorageClient::new(store_url));

    // Write through to the store.
    let response = app
        .clone()
        .oneshot(post_key(r#"{"key":"u","value":{"n":1},"persist":true}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["persisted"], json!(true));

    // Wipe the cache; the durable copy must survive.
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Miss without fallback.
    let response = app.clone().oneshot(get_uri("/api/keys/u")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Fallback pulls from the store and populates the cache.
    let response = app
        .clone()
        .oneshot(get_uri("/api/keys/u?fallback=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["value"], json!({"n": 1}));

    // Proof of populate: a plain get now hits.
    let response = app.oneshot(get_uri("/api/keys/u")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["value"], json!({"n": 1}));
}

#[tokio::test]
async fn test_fallback_against_dead_store_is_plain_miss() {
    // Connection refused on fallback must still answer 404, not 500.
    let app = cache_app_with_storage(StorageClient::new("http://127.0.0.1:1"));

    let response = app
        .oneshot(get_uri("/api/keys/ghost?fallback=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_persist_with_dead_store_still_caches() {
    let app = cache_app_with_storage(StorageClient::new("http://127.0.0.1:1"));

    let response = app
        .clone()
        .oneshot(post_key(r#"{"key":"k","value":1,"persist":true}"#))
        .await
        .unwrap();
    // The cache mutation succeeded; only the write-through failed.
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["persisted"], json!(false));

    let response = app.oneshot(get_uri("/api/keys/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

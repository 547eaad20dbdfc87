//! Integration tests for the HTTP routes
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, using a
//! fake photo search in place of Unsplash.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use portfolio::cache::CacheStore;
use portfolio::images::{FreshnessGate, ImageHit, ImageService, PhotoSearch};
use portfolio::quotes::QuoteClient;
use portfolio::server::{router, warm_cache, AppState};

/// Search returning two unique photos per query
#[derive(Default)]
struct FakeSearch {
    calls: AtomicUsize,
}

impl PhotoSearch for FakeSearch {
    async fn search(&self, query: &str, _count: usize) -> Vec<ImageHit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        vec![
            ImageHit::new(format!("{query}-a"), format!("https://img/{query}/a")),
            ImageHit::new(format!("{query}-b"), format!("https://img/{query}/b")),
        ]
    }
}

struct TestApp {
    router: Router,
    search: Arc<FakeSearch>,
    _temp_dir: TempDir,
}

fn test_app(dynamic: bool) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(temp_dir.path().join("site.css"), "body {}").expect("Should write asset");

    let store = Arc::new(CacheStore::load(temp_dir.path().join("cache.json")));
    let search = Arc::new(FakeSearch::default());
    let state = Arc::new(AppState {
        images: ImageService::new(FreshnessGate::new(search.clone(), store), dynamic),
        quotes: QuoteClient::with_url("http://127.0.0.1:9/api/random"),
    });

    TestApp {
        router: router(state, temp_dir.path()),
        search,
        _temp_dir: temp_dir,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Should build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Router should respond");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(router, uri).await;
    let value = serde_json::from_slice(&body).expect("Body should be JSON");
    (status, value)
}

#[tokio::test]
async fn test_city_images_dynamic() {
    let app = test_app(true);

    let (status, body) = get_json(&app.router, "/api/city-images/baltimore").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "dynamic");
    assert_eq!(body["images"].as_array().map(Vec::len), Some(26));
}

#[tokio::test]
async fn test_city_images_served_from_cache_on_second_request() {
    let app = test_app(true);

    let (_, first) = get_json(&app.router, "/api/city-images/dc").await;
    let (_, second) = get_json(&app.router, "/api/city-images/dc").await;

    assert_eq!(first, second);
    assert_eq!(app.search.calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_city_images_static_when_disabled() {
    let app = test_app(false);

    let (status, body) = get_json(&app.router, "/api/city-images/chicago").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"images": [], "source": "static"}));
    assert_eq!(app.search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let app = test_app(true);

    let (status, body) = get_json(&app.router, "/api/city-images/atlantis").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown city: atlantis");
    assert_eq!(app.search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_quote_upstream_failure_is_server_error() {
    let app = test_app(true);

    let (status, body) = get_json(&app.router, "/api/quote").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .is_some_and(|msg| msg.starts_with("quote service unavailable")));
}

#[tokio::test]
async fn test_health_probe() {
    let app = test_app(false);

    let (status, body) = get(&app.router, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = test_app(false);

    let (status, body) = get(&app.router, "/static/site.css").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"body {}");
}

#[tokio::test]
async fn test_missing_static_file_is_not_found() {
    let app = test_app(false);

    let (status, _) = get(&app.router, "/static/missing.css").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_warm_cache_fills_every_city() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(CacheStore::load(temp_dir.path().join("cache.json")));
    let search = Arc::new(FakeSearch::default());
    let images = ImageService::new(FreshnessGate::new(search.clone(), store.clone()), true);

    warm_cache(&images).await;

    assert_eq!(search.calls.load(Ordering::SeqCst), 13 + 10 + 10);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_warm_cache_skipped_when_disabled() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(CacheStore::load(temp_dir.path().join("cache.json")));
    let search = Arc::new(FakeSearch::default());
    let images = ImageService::new(FreshnessGate::new(search.clone(), store.clone()), false);

    warm_cache(&images).await;

    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    assert!(store.is_empty());
}

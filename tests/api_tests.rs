use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use qp_match::{
    cache::{bundled_thumbnails, AssetCache, CacheWriterHandle},
    error::{AppError, AppResult},
    models::{demo_catalog, Movie},
    routes::{create_router, AppState},
    services::{
        providers::{CatalogClient, PosterSource},
        HashEmbedder, MatchService, PosterPrefetcher, PrefetchSettings, RunStateStore,
    },
};

/// Catalog stand-in that serves canned search results and empty pages
struct FakeCatalog {
    search_results: Vec<Movie>,
    fail_search: bool,
    search_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl CatalogClient for FakeCatalog {
    async fn search(&self, _query: &str) -> AppResult<Vec<Movie>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(AppError::ExternalApi("TMDB returned status 503".to_string()));
        }
        Ok(self.search_results.clone())
    }

    async fn fetch_page(&self, _page: u32) -> AppResult<Vec<Movie>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Poster source that returns a fixed JPEG header for any path
struct FakePosters {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl PosterSource for FakePosters {
    async fn fetch_poster(&self, _path: &str) -> AppResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00])
    }
}

struct TestApp {
    server: TestServer,
    catalog: Arc<FakeCatalog>,
    posters: Arc<FakePosters>,
    _dir: tempfile::TempDir,
    _cache_writer: CacheWriterHandle,
}

async fn create_test_app(local_catalog: Vec<Movie>, catalog: FakeCatalog) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let (cache, cache_writer) = AssetCache::open(dir.path().join("posters"), 50).await;
    cache.bootstrap(bundled_thumbnails()).await;

    let catalog = Arc::new(catalog);
    let posters = Arc::new(FakePosters {
        calls: AtomicUsize::new(0),
    });

    let prefetcher = Arc::new(
        PosterPrefetcher::new(
            catalog.clone(),
            posters.clone(),
            cache.clone(),
            RunStateStore::new(dir.path().join("prefetch_state.json")),
            PrefetchSettings::default(),
            CancellationToken::new(),
        )
        .await,
    );

    let state = Arc::new(AppState {
        matcher: Arc::new(MatchService::new(
            local_catalog,
            Arc::new(HashEmbedder::new()),
        )),
        catalog: catalog.clone(),
        posters: posters.clone(),
        cache,
        prefetcher,
    });

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        catalog,
        posters,
        _dir: dir,
        _cache_writer: cache_writer,
    }
}

fn fake_catalog(search_results: Vec<Movie>, fail_search: bool) -> FakeCatalog {
    FakeCatalog {
        search_results,
        fail_search,
        search_calls: AtomicUsize::new(0),
    }
}

async fn demo_app() -> TestApp {
    create_test_app(demo_catalog(), fake_catalog(Vec::new(), false)).await
}

fn ids(movies: &[Value]) -> Vec<i64> {
    movies.iter().map(|m| m["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = demo_app().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("ios-1234"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "ios-1234");

    let response = app.server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_autocomplete_ranks_title_first() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/autocomplete")
        .add_query_param("q", "Inception")
        .add_query_param("limit", 3)
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0]["title"], "Inception");
}

#[tokio::test]
async fn test_autocomplete_blank_query_is_empty() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/autocomplete")
        .add_query_param("q", "   ")
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert!(movies.is_empty());
}

#[tokio::test]
async fn test_recommendations_for_empty_profile_follow_catalog_order() {
    let app = demo_app().await;

    let response = app
        .server
        .post("/api/v1/recommendations")
        .json(&json!({ "profile": {} }))
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(ids(&movies), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_recommendations_use_favorites() {
    let app = demo_app().await;

    let response = app
        .server
        .post("/api/v1/recommendations")
        .json(&json!({
            "profile": {
                "location": "Mumbai",
                "gender": "Female",
                "age": 30,
                "favorite_movies": [
                    { "id": 1, "title": "Inception", "overview": "" },
                    { "id": 3, "title": "Dangal", "overview": "" }
                ]
            },
            "limit": 3
        }))
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(ids(&movies), vec![1, 3, 4]);
}

#[tokio::test]
async fn test_recommendations_reject_large_limit() {
    let app = demo_app().await;

    let response = app
        .server
        .post("/api/v1/recommendations")
        .json(&json!({ "profile": {}, "limit": 500 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_falls_back_to_remote_catalog() {
    let local = vec![Movie::new(1, "Inception", "A mind-bending heist through dreams.")];
    let remote = vec![
        Movie::new(1, "Inception", "duplicate from remote"),
        Movie::new(27205, "Inception", "Cobb steals secrets."),
    ];
    let app = create_test_app(local, fake_catalog(remote, false)).await;

    let response = app
        .server
        .get("/api/v1/titles/search")
        .add_query_param("q", "Inception")
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(ids(&movies), vec![1, 27205]);
    assert_eq!(movies[0]["overview"], "A mind-bending heist through dreams.");
    assert_eq!(app.catalog.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_skips_remote_with_enough_local_matches() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/titles/search")
        .add_query_param("q", "Dangal")
        .await;

    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies[0]["title"], "Dangal");
    assert_eq!(app.catalog.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_remote_failure_is_bad_gateway() {
    let app = create_test_app(Vec::new(), fake_catalog(Vec::new(), true)).await;

    let response = app
        .server
        .get("/api/v1/titles/search")
        .add_query_param("q", "Anything")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_bundled_poster_is_served() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/posters")
        .add_query_param("key", "demo-1")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(app.posters.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_demo_poster_is_not_found() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/posters")
        .add_query_param("key", "demo-99")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remote_poster_is_fetched_on_miss() {
    let app = demo_app().await;

    let response = app
        .server
        .get("/api/v1/posters")
        .add_query_param("key", "/qJ2tW6WMUDux911r6m7haRef0WH.jpg")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(response.as_bytes().as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
    assert_eq!(app.posters.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prefetch_is_accepted() {
    let app = demo_app().await;

    let response = app.server.post("/api/v1/prefetch").await;

    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert!(body["running"].is_boolean());
}

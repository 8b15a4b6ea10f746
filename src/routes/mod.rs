use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    cache::AssetCache,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::{CatalogClient, PosterSource},
        MatchService, PosterPrefetcher,
    },
};

pub mod posters;
pub mod prefetch;
pub mod recommendations;
pub mod titles;

/// Explicitly constructed services shared by every handler
pub struct AppState {
    pub matcher: Arc<MatchService>,
    pub catalog: Arc<dyn CatalogClient>,
    pub posters: Arc<dyn PosterSource>,
    pub cache: AssetCache,
    pub prefetcher: Arc<PosterPrefetcher>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/autocomplete", get(titles::autocomplete))
        .route("/titles/search", get(titles::search))
        .route("/posters", get(posters::poster))
        .route("/prefetch", post(prefetch::start))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

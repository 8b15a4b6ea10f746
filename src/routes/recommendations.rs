use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Movie, UserProfile},
    routes::AppState,
};

/// Largest `limit` a caller may ask for
pub const MAX_LIMIT: usize = 50;

fn default_limit() -> usize {
    4
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub profile: UserProfile,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Movie>>> {
    if request.limit > MAX_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "limit must be at most {}",
            MAX_LIMIT
        )));
    }

    let movies = state.matcher.recommend(&request.profile, request.limit);

    tracing::info!(
        request_id = %request_id,
        limit = request.limit,
        results = movies.len(),
        "Recommendations served"
    );

    Ok(Json(movies))
}

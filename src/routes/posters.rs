use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PosterQuery {
    key: String,
}

/// Serves a poster from the asset cache.
///
/// On a miss, keys that look like TMDB poster paths (`/xyz.jpg`) are fetched,
/// returned, and stored in the background; anything else is a 404.
pub async fn poster(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PosterQuery>,
) -> AppResult<impl IntoResponse> {
    let key = params.key;

    let bytes = match state.cache.read(&key).await {
        Some(bytes) => bytes,
        None if key.starts_with('/') => {
            let bytes = state.posters.fetch_poster(&key).await?;
            state.cache.store_in_background(&key, bytes.clone());
            tracing::debug!(key = %key, size = bytes.len(), "Poster fetched on demand");
            bytes
        }
        None => return Err(AppError::NotFound(format!("Poster {} is not cached", key))),
    };

    Ok(([(header::CONTENT_TYPE, content_type(&bytes))], bytes))
}

fn content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    routes::{recommendations::MAX_LIMIT, AppState},
    services::title_search::{self, SEARCH_LIMIT},
};

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for local autocomplete
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let limit = params.limit.unwrap_or(SEARCH_LIMIT);
    if limit > MAX_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "limit must be at most {}",
            MAX_LIMIT
        )));
    }
    Ok(Json(state.matcher.autocomplete(&params.q, limit)))
}

/// Handler for title search endpoint (local matches, then the remote catalog)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let titles =
        title_search::search_titles(&state.matcher, state.catalog.as_ref(), &params.q).await?;
    Ok(Json(titles))
}

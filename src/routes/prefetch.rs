use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::routes::AppState;

/// Handler that kicks off a poster prefetch run if one is due
pub async fn start(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    state.prefetcher.start_if_needed();

    let last_completed_at = state.prefetcher.last_completed_at();
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "running": state.prefetcher.is_running(),
            "last_completed_at": last_completed_at,
        })),
    )
}

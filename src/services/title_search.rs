use crate::{
    error::AppResult,
    models::{unique_by_id, Movie},
    services::{matching::MatchService, providers::CatalogClient},
};

/// Maximum number of merged search results
pub const SEARCH_LIMIT: usize = 12;

/// Below this many local matches the remote catalog is consulted too
pub const REMOTE_FALLBACK_THRESHOLD: usize = 4;

/// Title search combining local autocomplete with the remote catalog.
///
/// Local matches come first. A remote failure is returned to the caller.
pub async fn search_titles(
    matcher: &MatchService,
    catalog: &dyn CatalogClient,
    query: &str,
) -> AppResult<Vec<Movie>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let local = matcher.autocomplete(trimmed, SEARCH_LIMIT);
    if local.len() >= REMOTE_FALLBACK_THRESHOLD {
        return Ok(local);
    }

    let remote = catalog.search(trimmed).await.map_err(|e| {
        tracing::error!(
            error = %e,
            query = %trimmed,
            provider = catalog.name(),
            "Remote title search failed"
        );
        e
    })?;

    let mut merged = unique_by_id(local.into_iter().chain(remote));
    merged.truncate(SEARCH_LIMIT);
    Ok(merged)
}

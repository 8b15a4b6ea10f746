use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    models::{unique_by_id, Movie, MovieId, UserProfile},
    services::{
        projector::ProfileProjector, similarity_index::SimilarityIndex, vectorizer::TextEmbedder,
    },
};

/// Recommendation and autocomplete facade over the local catalog.
///
/// Purely in-memory: never touches disk or network, and every method takes
/// `&self`, so one instance is shared by all request handlers.
pub struct MatchService {
    catalog: Vec<Movie>,
    positions: HashMap<MovieId, usize>,
    index: SimilarityIndex,
    projector: ProfileProjector,
    embedder: Arc<dyn TextEmbedder>,
}

impl MatchService {
    /// Indexes `catalog` with `embedder`
    pub fn new(catalog: Vec<Movie>, embedder: Arc<dyn TextEmbedder>) -> Self {
        let index = SimilarityIndex::build(&catalog, embedder.as_ref());

        let mut positions = HashMap::new();
        for (position, movie) in catalog.iter().enumerate() {
            positions.entry(movie.id).or_insert(position);
        }

        tracing::info!(catalog_size = catalog.len(), "Match service ready");

        Self {
            catalog,
            positions,
            index,
            projector: ProfileProjector::new(embedder.clone()),
            embedder,
        }
    }

    pub fn catalog(&self) -> &[Movie] {
        &self.catalog
    }

    /// Movies closest to the user's profile, best first, without repeated ids
    pub fn recommend(&self, profile: &UserProfile, limit: usize) -> Vec<Movie> {
        let query = self.projector.project(profile);
        let movies = self.resolve(self.index.top_k(&query, limit));

        tracing::debug!(
            limit,
            results = movies.len(),
            favorites = profile.favorite_movies.len(),
            "Recommendations computed"
        );

        movies
    }

    /// Movies closest to the typed query, best first.
    ///
    /// A blank query returns nothing without embedding or scoring.
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<Movie> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let vector = self.embedder.embed(query);
        self.resolve(self.index.top_k(&vector, limit))
    }

    fn resolve(&self, ids: Vec<MovieId>) -> Vec<Movie> {
        unique_by_id(
            ids.into_iter()
                .filter_map(|id| self.positions.get(&id))
                .map(|&position| self.catalog[position].clone()),
        )
    }
}

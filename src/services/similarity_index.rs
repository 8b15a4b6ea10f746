use crate::{
    models::{Movie, MovieId},
    services::vectorizer::{cosine, TextEmbedder},
};

/// Vector of one catalog item, computed once when the index is built
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub id: MovieId,
    pub vector: Vec<f32>,
}

/// A ranked hit returned by [`SimilarityIndex::rank`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredId {
    pub id: MovieId,
    pub score: f32,
}

/// Read-only nearest-neighbour index over the catalog.
///
/// Records keep catalog order, which is also the tie-break order for equal
/// scores. Nothing mutates the index after construction, so it can be shared
/// across tasks behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    records: Vec<EmbeddingRecord>,
}

impl SimilarityIndex {
    /// Embeds `title + " " + overview` of every movie, in catalog order
    pub fn build(catalog: &[Movie], embedder: &dyn TextEmbedder) -> Self {
        let records: Vec<EmbeddingRecord> = catalog
            .iter()
            .map(|movie| EmbeddingRecord {
                id: movie.id,
                vector: embedder.embed(&movie.index_text()),
            })
            .collect();

        tracing::debug!(records = records.len(), "Similarity index built");

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Scores every record against `query` and returns the best `limit`,
    /// highest score first. Equal scores keep catalog order.
    pub fn rank(&self, query: &[f32], limit: usize) -> Vec<ScoredId> {
        let mut scored: Vec<ScoredId> = self
            .records
            .iter()
            .map(|record| ScoredId {
                id: record.id,
                score: cosine(query, &record.vector),
            })
            .collect();

        // `sort_by` is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    /// Ids of the `min(limit, len)` best matches for `query`
    pub fn top_k(&self, query: &[f32], limit: usize) -> Vec<MovieId> {
        self.rank(query, limit).into_iter().map(|hit| hit.id).collect()
    }
}

//! Text vectorization
//!
//! Turns free text into fixed-length, L2-normalized vectors. The only backend
//! today is a deterministic token-hashing scheme; a trained model can be plugged
//! in behind [`TextEmbedder`] without touching the index or the matching service.

use xxhash_rust::xxh64::xxh64;

/// Dimension of every vector produced by [`HashEmbedder`]
pub const DIMENSION: usize = 64;

/// Capability for turning text into a fixed-length vector
#[cfg_attr(test, mockall::automock)]
pub trait TextEmbedder: Send + Sync {
    /// Embeds `text`. Must be pure and deterministic.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Length of every vector returned by `embed`
    fn dimension(&self) -> usize;
}

/// Bag-of-words embedder that hashes each token into one of `DIMENSION` buckets
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        vectorize(text)
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

/// Lower-cases `text`, splits it into alphabetic runs and counts each token in
/// the bucket `abs(xxh64(token)) mod DIMENSION`, then L2-normalizes.
///
/// Text without any alphabetic run yields the zero vector.
pub fn vectorize(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMENSION];
    let lowered = text.to_lowercase();

    for token in lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
    {
        vector[bucket(token)] += 1.0;
    }

    normalize(vector)
}

fn bucket(token: &str) -> usize {
    let hash = xxh64(token.as_bytes(), 0) as i64;
    (hash.unsigned_abs() % DIMENSION as u64) as usize
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let magnitude = magnitude(&vector);
    if magnitude > 0.0 {
        vector.iter_mut().for_each(|x| *x /= magnitude);
    }
    vector
}

/// Euclidean norm
pub fn magnitude(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity of two vectors.
///
/// Returns 0 when the lengths differ or either vector has zero magnitude.
pub fn cosine(lhs: &[f32], rhs: &[f32]) -> f32 {
    if lhs.len() != rhs.len() {
        return 0.0;
    }
    let (lhs_mag, rhs_mag) = (magnitude(lhs), magnitude(rhs));
    if lhs_mag == 0.0 || rhs_mag == 0.0 {
        return 0.0;
    }
    let dot: f32 = lhs.iter().zip(rhs).map(|(a, b)| a * b).sum();
    dot / (lhs_mag * rhs_mag)
}

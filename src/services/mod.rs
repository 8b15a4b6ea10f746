pub mod matching;
pub mod prefetch;
pub mod projector;
pub mod providers;
pub mod similarity_index;
pub mod title_search;
pub mod vectorizer;

pub use matching::MatchService;
pub use prefetch::{PosterPrefetcher, PrefetchSettings, RunStateStore};
pub use projector::ProfileProjector;
pub use similarity_index::SimilarityIndex;
pub use vectorizer::{HashEmbedder, TextEmbedder};

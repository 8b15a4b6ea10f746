//! External catalog collaborators
//!
//! The matching engine never calls these; they back the merged title search,
//! the poster route and the background prefetcher.

use crate::{error::AppResult, models::Movie};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Remote movie catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text title search
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// One page of the popular listing, starting at page 1
    async fn fetch_page(&self, page: u32) -> AppResult<Vec<Movie>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Source of poster image bytes, addressed by poster path
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterSource: Send + Sync {
    async fn fetch_poster(&self, path: &str) -> AppResult<Vec<u8>>;
}

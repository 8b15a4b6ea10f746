//! TMDB provider
//!
//! Title search and the popular listing come from the v3 REST API, posters
//! from the image CDN:
//! 1. Search: /search/movie?query=...
//! 2. Popular: /movie/popular?page=N (20 movies per page)
//! 3. Poster: {image_url}{poster_path}

use crate::{
    error::{AppError, AppResult},
    models::{Movie, TmdbPage},
    services::providers::{CatalogClient, PosterSource},
};
use reqwest::{Client as HttpClient, Response};

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String, image_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            image_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    fn poster_url(&self, path: &str) -> String {
        format!("{}{}", self.image_url.trim_end_matches('/'), path)
    }

    async fn fetch_movies(&self, url: &str, query: &[(&str, &str)]) -> AppResult<Vec<Movie>> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let page: TmdbPage = ensure_success(response).await?.json().await?;
        Ok(page.results.into_iter().map(Movie::from).collect())
    }
}

async fn ensure_success(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::ExternalApi(format!(
        "TMDB returned status {}: {}",
        status, body
    )))
}

#[async_trait::async_trait]
impl CatalogClient for TmdbClient {
    async fn search(&self, query: &str) -> AppResult<Vec<Movie>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("search/movie");
        let movies = self
            .fetch_movies(&url, &[("query", query), ("include_adult", "false")])
            .await?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(movies)
    }

    async fn fetch_page(&self, page: u32) -> AppResult<Vec<Movie>> {
        let url = self.endpoint("movie/popular");
        let page_param = page.to_string();
        let movies = self.fetch_movies(&url, &[("page", page_param.as_str())]).await?;

        tracing::debug!(page, results = movies.len(), "Popular page fetched");

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[async_trait::async_trait]
impl PosterSource for TmdbClient {
    async fn fetch_poster(&self, path: &str) -> AppResult<Vec<u8>> {
        if !path.starts_with('/') {
            return Err(AppError::InvalidInput(format!(
                "Poster path must start with '/': {}",
                path
            )));
        }

        let response = self.http_client.get(self.poster_url(path)).send().await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> TmdbClient {
        TmdbClient::new(
            "test_key".to_string(),
            "http://test.local/3/".to_string(),
            "http://images.test.local/t/p/w500/".to_string(),
        )
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = create_test_client();
        assert_eq!(
            client.endpoint("movie/popular"),
            "http://test.local/3/movie/popular"
        );
    }

    #[test]
    fn test_poster_url() {
        let client = create_test_client();
        assert_eq!(
            client.poster_url("/abc.jpg"),
            "http://images.test.local/t/p/w500/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_empty_search_skips_request() {
        let client = create_test_client();
        let movies = client.search("").await.unwrap();
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_poster_path_must_be_absolute() {
        let client = create_test_client();
        let err = client.fetch_poster("demo-1").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(create_test_client().name(), "tmdb");
    }
}

use serde::Deserialize;

pub mod movie;
pub mod profile;

pub use movie::{demo_catalog, unique_by_id, Movie, MovieId};
pub use profile::{Gender, UserProfile};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged result list returned by `/search/movie` and `/movie/popular`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Raw movie entry from the TMDB API
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbMovie> for Movie {
    fn from(dto: TmdbMovie) -> Self {
        Movie {
            id: MovieId(dto.id),
            title: dto.title,
            overview: dto.overview,
            poster_path: dto.poster_path,
            runtime_minutes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_page_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 27205,
                    "title": "Inception",
                    "overview": "Cobb, a skilled thief...",
                    "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
                    "vote_average": 8.4
                },
                {
                    "id": 129,
                    "title": "Spirited Away",
                    "poster_path": null
                }
            ],
            "total_pages": 500,
            "total_results": 10000
        }"#;

        let page: TmdbPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 500);
        assert_eq!(page.results.len(), 2);

        let movies: Vec<Movie> = page.results.into_iter().map(Movie::from).collect();
        assert_eq!(movies[0].id, MovieId(27205));
        assert_eq!(
            movies[0].poster_path.as_deref(),
            Some("/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg")
        );
        assert_eq!(movies[1].overview, "");
        assert_eq!(movies[1].poster_path, None);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

/// Catalog identifier of a movie (TMDB numeric id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie as shown to the user and indexed for matching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
}

impl Movie {
    pub fn new(id: i64, title: &str, overview: &str) -> Self {
        Self {
            id: MovieId(id),
            title: title.to_string(),
            overview: overview.to_string(),
            poster_path: None,
            runtime_minutes: None,
        }
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime_minutes = Some(minutes);
        self
    }

    pub fn with_poster(mut self, path: &str) -> Self {
        self.poster_path = Some(path.to_string());
        self
    }

    /// Text fed to the embedder when the movie is indexed
    pub fn index_text(&self) -> String {
        format!("{} {}", self.title, self.overview)
    }

    /// Key under which the poster is stored in the asset cache.
    ///
    /// Movies without a poster path fall back to the bundled `demo-{id}` thumbnail.
    pub fn poster_cache_key(&self) -> String {
        match &self.poster_path {
            Some(path) => path.clone(),
            None => format!("demo-{}", self.id),
        }
    }

    /// Full poster URL under the given image base
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base.trim_end_matches('/'), path))
    }

    /// Runtime as "2h 28m", "45m", or empty when unknown
    pub fn display_runtime(&self) -> String {
        let Some(minutes) = self.runtime_minutes else {
            return String::new();
        };
        let (h, m) = (minutes / 60, minutes % 60);
        if h > 0 {
            format!("{}h {}m", h, m)
        } else {
            format!("{}m", m)
        }
    }
}

/// Removes repeated ids, keeping the first occurrence and the original order
pub fn unique_by_id(movies: impl IntoIterator<Item = Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies
        .into_iter()
        .filter(|movie| seen.insert(movie.id))
        .collect()
}

/// Built-in catalog used to seed the similarity index
pub fn demo_catalog() -> Vec<Movie> {
    vec![
        Movie::new(1, "Inception", "A mind-bending heist through dreams.").with_runtime(148),
        Movie::new(
            2,
            "Lagaan",
            "Villagers challenge the British to a game of cricket.",
        )
        .with_runtime(224),
        Movie::new(
            3,
            "Dangal",
            "A father trains his daughters to become wrestlers.",
        )
        .with_runtime(161),
        Movie::new(
            4,
            "Mad Max: Fury Road",
            "A high-octane escape across the wasteland.",
        )
        .with_runtime(120),
        Movie::new(
            5,
            "Spirited Away",
            "A young girl becomes trapped in a spirit world bathhouse.",
        )
        .with_runtime(125),
        Movie::new(
            6,
            "The Social Network",
            "The founding of Facebook sparks friendship and legal battles.",
        )
        .with_runtime(120),
    ]
}

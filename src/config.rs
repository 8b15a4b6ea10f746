use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key used for catalog search, popular pages and posters
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Root directory of the on-disk poster cache
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Maximum number of files kept in the poster cache
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// File holding the timestamp of the last completed prefetch run
    #[serde(default = "default_prefetch_state_path")]
    pub prefetch_state_path: PathBuf,

    /// Highest catalog page the prefetcher walks to
    #[serde(default = "default_prefetch_max_pages")]
    pub prefetch_max_pages: u32,

    /// Minimum number of days between two prefetch runs
    #[serde(default = "default_prefetch_cooldown_days")]
    pub prefetch_cooldown_days: i64,

    /// Whether to kick off a prefetch run when the server starts
    #[serde(default = "default_prefetch_on_startup")]
    pub prefetch_on_startup: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/posters")
}

fn default_cache_max_entries() -> usize {
    500
}

fn default_prefetch_state_path() -> PathBuf {
    PathBuf::from("./data/prefetch_state.json")
}

fn default_prefetch_max_pages() -> u32 {
    50 // 20 movies per page ≈ 1000 posters
}

fn default_prefetch_cooldown_days() -> i64 {
    7
}

fn default_prefetch_on_startup() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

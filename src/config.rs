use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Catalog sources (first configured one is used: file, JSON URL, playlists)
    pub catalog_file: Option<String>,
    pub catalog_url: Option<String>,
    pub playlist_urls: Vec<String>,

    // Caching
    pub cache_duration_secs: u64,

    // Fetching
    pub fetch_timeout_ms: u64,
    pub max_retries: u32,
    pub max_playlist_size_mb: usize,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup, applying defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            // Server
            port: get("PORT", "5000").parse().unwrap_or(5000),
            node_env: get("NODE_ENV", "development"),

            // Catalog sources
            catalog_file: optional("CATALOG_FILE"),
            catalog_url: optional("CATALOG_URL"),
            playlist_urls: parse_url_list(&get("PLAYLIST_URLS", "")),

            // Caching
            cache_duration_secs: get("CACHE_DURATION_SECS", "300").parse().unwrap_or(300), // 5 minutes

            // Fetching
            fetch_timeout_ms: get("FETCH_TIMEOUT_MS", "30000").parse().unwrap_or(30_000), // 30 seconds
            max_retries: get("MAX_RETRIES", "2").parse().unwrap_or(2),
            max_playlist_size_mb: get("MAX_PLAYLIST_SIZE_MB", "100").parse().unwrap_or(100),

            // Use VLC user agent to avoid IPTV server blocks
            user_agent: get("USER_AGENT", "VLC/3.0.20 LibVLC/3.0.20"),
        }
    }
}

/// Split a comma/whitespace separated URL list, dropping blanks
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

use serde::Deserialize;
use std::path::PathBuf;

/// User-Agent sent with cover requests; some image hosts reject non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Catalog CSV (book_title, book_author, img_l, user_id, rating)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Known user ids, byte-encoded JSON list
    #[serde(default = "default_user_ids_path")]
    pub user_ids_path: PathBuf,

    /// Known book titles, byte-encoded JSON list
    #[serde(default = "default_book_titles_path")]
    pub book_titles_path: PathBuf,

    /// Exported retrieval index
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// User-Agent header sent when fetching cover images
    #[serde(default = "default_cover_user_agent")]
    pub cover_user_agent: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("filtered_df.csv")
}

fn default_user_ids_path() -> PathBuf {
    PathBuf::from("unique_user_ids.json")
}

fn default_book_titles_path() -> PathBuf {
    PathBuf::from("unique_book_titles.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("saved_index/index.json")
}

fn default_cover_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use std::env;

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub static_dir: String,
    pub media_dir: String,
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    /// Bootstrap admin account, created at startup when both are set
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://moviereviews.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
            omdb_api_key: non_empty_var("OMDB_API_KEY"),
            omdb_base_url: env::var("OMDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OMDB_BASE_URL.to_string()),
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

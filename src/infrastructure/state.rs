//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{CatalogRepository, ReviewRepository, UserRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::{SeaOrmCatalogRepository, SeaOrmReviewRepository, SeaOrmUserRepository};
use crate::modules::integrations::ImdbClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Movies, genres, directors
    pub catalog: Arc<dyn CatalogRepository>,
    /// Reviews, comments, reactions
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Present only when an OMDb API key is configured
    pub imdb: Option<ImdbClient>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            catalog: Arc::new(SeaOrmCatalogRepository::new(db.clone())),
            reviews: Arc::new(SeaOrmReviewRepository::new(db.clone())),
            users: Arc::new(SeaOrmUserRepository::new(db)),
            imdb: None,
        }
    }

    pub fn from_config(db: DatabaseConnection, config: &Config) -> Self {
        let mut state = Self::new(db);

        if let Some(key) = &config.omdb_api_key {
            match ImdbClient::new(&config.omdb_base_url, key) {
                Ok(client) => state.imdb = Some(client),
                Err(e) => tracing::error!("IMDb ratings disabled: {}", e),
            }
        } else {
            tracing::info!("OMDB_API_KEY not set, IMDb ratings disabled");
        }

        state
    }

    pub fn with_imdb(mut self, client: ImdbClient) -> Self {
        self.imdb = Some(client);
        self
    }
}

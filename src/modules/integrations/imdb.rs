//! IMDb rating lookup through the OMDb API
//!
//! `GET {base}/?i=<imdb id>&apikey=<key>` answers with
//! `{"Response":"True","imdbRating":"8.5",...}` or
//! `{"Response":"False","Error":"Incorrect IMDb ID."}`.

use serde::Deserialize;
use std::time::Duration;

use crate::domain::DomainError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Clone)]
pub struct ImdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ImdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Rating on IMDb's 0-10 scale; `None` when OMDb has no rating
    pub async fn fetch_rating(&self, imdb_id: &str) -> Result<Option<f32>, DomainError> {
        let res = self
            .http
            .get(format!("{}/", self.base_url))
            .query(&[("i", imdb_id), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| DomainError::External(format!("OMDb request failed: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::External(format!(
                "OMDb API returned status: {}",
                res.status()
            )));
        }

        let body: OmdbResponse = res
            .json()
            .await
            .map_err(|e| DomainError::External(format!("Failed to parse OMDb JSON: {}", e)))?;

        if body.response != "True" {
            tracing::debug!(
                "OMDb has no entry for {}: {}",
                imdb_id,
                body.error.unwrap_or_default()
            );
            return Ok(None);
        }

        Ok(body.imdb_rating.and_then(|r| r.trim().parse::<f32>().ok()))
    }

    /// Like [`fetch_rating`](Self::fetch_rating) but never fails; errors are
    /// logged and the page renders without a rating.
    pub async fn rating_or_none(&self, imdb_id: &str) -> Option<f32> {
        match self.fetch_rating(imdb_id).await {
            Ok(rating) => rating,
            Err(e) => {
                tracing::warn!("IMDb rating for {} unavailable: {}", imdb_id, e);
                None
            }
        }
    }
}

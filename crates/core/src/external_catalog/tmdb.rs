//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::MovieMetadata;
use super::{ExternalCatalogError, MetadataSource};

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Language for titles in search results (default: ru).
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Language of the fallback backdrop.
const BACKDROP_LANGUAGE: &str = "en";

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, ExternalCatalogError> {
        if config.api_key.is_empty() {
            return Err(ExternalCatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            language: config.language,
        })
    }

    /// Search for movies by query, narrowed by year when given.
    pub async fn search_movies(
        &self,
        query: &str,
        year: Option<u32>,
    ) -> Result<Vec<MovieMetadata>, ExternalCatalogError> {
        let url = format!("{}/search/movie", self.base_url);

        debug!("TMDB movie search: query='{}', year={:?}", query, year);

        let mut request = self.client.get(&url).query(&[
            ("api_key", self.api_key.as_str()),
            ("query", query),
            ("language", self.language.as_str()),
        ]);

        if let Some(y) = year {
            request = request.query(&[("year", &y.to_string())]);
        }

        let response = check_status(request.send().await?).await?;

        let search_result: TmdbSearchResponse = response.json().await.map_err(|e| {
            ExternalCatalogError::ParseError(format!(
                "Failed to parse movie search response: {}",
                e
            ))
        })?;

        Ok(search_result
            .results
            .into_iter()
            .map(MovieMetadata::from)
            .collect())
    }

    /// First English backdrop of a movie, if it has any.
    pub async fn english_backdrop(
        &self,
        tmdb_id: u32,
    ) -> Result<Option<String>, ExternalCatalogError> {
        let url = format!("{}/movie/{}/images", self.base_url, tmdb_id);

        debug!("TMDB movie images: id={}", tmdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("include_image_language", BACKDROP_LANGUAGE),
            ])
            .send()
            .await?;

        if response.status() == 404 {
            return Err(ExternalCatalogError::NotFound(format!("Movie ID {}", tmdb_id)));
        }
        let response = check_status(response).await?;

        let images: TmdbImagesResponse = response.json().await.map_err(|e| {
            ExternalCatalogError::ParseError(format!("Failed to parse images response: {}", e))
        })?;

        Ok(images
            .backdrops
            .into_iter()
            .find(|b| b.iso_639_1.as_deref().map_or(true, |l| l == BACKDROP_LANGUAGE))
            .map(|b| b.file_path))
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn lookup(
        &self,
        title: &str,
        year: &str,
    ) -> Result<Option<MovieMetadata>, ExternalCatalogError> {
        let year = year.trim().parse::<u32>().ok();
        let Some(mut candidate) = self.search_movies(title, year).await?.into_iter().next() else {
            return Ok(None);
        };

        if candidate.backdrop_path.is_none() {
            match self.english_backdrop(candidate.id).await {
                Ok(backdrop) => candidate.backdrop_path = backdrop,
                Err(e) => debug!("TMDB backdrop fallback failed for {}: {}", candidate.id, e),
            }
        }

        Ok(Some(candidate))
    }
}

/// Map TMDB error statuses onto catalog errors.
async fn check_status(response: Response) -> Result<Response, ExternalCatalogError> {
    let status = response.status();
    if status == 401 {
        return Err(ExternalCatalogError::NotConfigured(
            "Invalid TMDB API key".to_string(),
        ));
    }
    if status == 429 {
        return Err(ExternalCatalogError::RateLimitExceeded);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExternalCatalogError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbMovieResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbImagesResponse {
    #[serde(default)]
    backdrops: Vec<TmdbImage>,
}

#[derive(Debug, Deserialize)]
struct TmdbImage {
    file_path: String,
    iso_639_1: Option<String>,
}

impl From<TmdbMovieResult> for MovieMetadata {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id,
            title: r.title,
            original_title: r.original_title.unwrap_or_default(),
            // TMDB sends "" for unknown dates
            release_date: r.release_date.filter(|d| !d.is_empty()),
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            vote_average: r.vote_average,
            vote_count: r.vote_count,
        }
    }
}

//! External catalog integration for movie metadata.
//!
//! This module provides the `MetadataSource` seam used by enrichment, a TMDB
//! client implementing it, and the acceptance policy that decides whether a
//! looked-up candidate is the same movie.

mod matcher;
mod tmdb;
mod types;

pub use matcher::{accepts, enrich_movie};
pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with external catalogs.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A catalog that can look movies up by title and year.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Find the best candidate for `title`, narrowed by `year` when not empty.
    ///
    /// `Ok(None)` means the catalog had no result at all.
    async fn lookup(
        &self,
        title: &str,
        year: &str,
    ) -> Result<Option<MovieMetadata>, ExternalCatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExternalCatalogError::ApiError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert_eq!(
            ExternalCatalogError::NotConfigured("Invalid TMDB API key".to_string()).to_string(),
            "Client not configured: Invalid TMDB API key"
        );
    }
}

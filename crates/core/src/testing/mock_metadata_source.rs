//! Mock metadata source for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::external_catalog::{ExternalCatalogError, MetadataSource, MovieMetadata};

/// A recorded lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLookup {
    pub title: String,
    pub year: String,
}

/// Mock implementation of the MetadataSource trait.
///
/// Candidates are keyed by lower-cased title; the year is ignored so tests
/// can exercise year rejection in the acceptance policy.
///
/// # Example
///
/// ```rust,ignore
/// use moviestracker_core::testing::{MockMetadataSource, fixtures};
///
/// let source = MockMetadataSource::new()
///     .with_movie("Bad Boys", fixtures::metadata(1, "Bad Boys", "Bad Boys", "2024-06-05"));
///
/// let candidate = source.lookup("bad boys", "2024").await?;
/// assert!(candidate.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockMetadataSource {
    movies: Arc<RwLock<HashMap<String, MovieMetadata>>>,
    /// One-shot errors by lower-cased title.
    errors: Arc<RwLock<HashMap<String, ExternalCatalogError>>>,
    lookups: Arc<RwLock<Vec<RecordedLookup>>>,
}

impl MockMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`add_movie`](Self::add_movie).
    pub fn with_movie(self, title: &str, metadata: MovieMetadata) -> Self {
        self.add_movie(title, metadata);
        self
    }

    /// Return `metadata` for lookups of `title`.
    pub fn add_movie(&self, title: &str, metadata: MovieMetadata) {
        self.movies
            .write()
            .unwrap()
            .insert(title.trim().to_lowercase(), metadata);
    }

    /// Fail the next lookup of `title` with `error`.
    pub fn fail_with(&self, title: &str, error: ExternalCatalogError) {
        self.errors
            .write()
            .unwrap()
            .insert(title.trim().to_lowercase(), error);
    }

    /// All recorded lookups.
    pub fn lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for MockMetadataSource {
    async fn lookup(
        &self,
        title: &str,
        year: &str,
    ) -> Result<Option<MovieMetadata>, ExternalCatalogError> {
        self.lookups.write().unwrap().push(RecordedLookup {
            title: title.to_string(),
            year: year.to_string(),
        });

        let key = title.trim().to_lowercase();
        if let Some(error) = self.errors.write().unwrap().remove(&key) {
            return Err(error);
        }

        Ok(self.movies.read().unwrap().get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_lookup_by_title() {
        let source = MockMetadataSource::new().with_movie(
            "Bad Boys",
            fixtures::metadata(1, "Плохие парни", "Bad Boys", "2024-06-05"),
        );

        let found = source.lookup("  BAD BOYS ", "2024").await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(1));
        assert!(source.lookup("Unknown", "").await.unwrap().is_none());
        assert_eq!(source.lookups().len(), 2);
    }

    #[tokio::test]
    async fn test_error_is_one_shot() {
        let source = MockMetadataSource::new();
        source.fail_with("Dune", ExternalCatalogError::RateLimitExceeded);

        assert!(source.lookup("Dune", "2021").await.is_err());
        assert!(source.lookup("Dune", "2021").await.unwrap().is_none());
    }
}

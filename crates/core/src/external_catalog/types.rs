//! Types for external catalog lookups.

use serde::{Deserialize, Serialize};

/// Metadata found for a movie in an external catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieMetadata {
    /// Catalog movie ID.
    pub id: u32,
    /// Title in the lookup language.
    pub title: String,
    /// Title in the original language.
    #[serde(default)]
    pub original_title: String,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Poster path (relative to the catalog image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Backdrop path (relative to the catalog image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    /// Average vote (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
}

impl MovieMetadata {
    /// Release year taken from the release date, if any.
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .map(str::trim)
            .filter(|y| !y.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_release_date() {
        let movie = MovieMetadata {
            id: 1,
            title: "Test Movie".to_string(),
            release_date: Some("1999-03-31".to_string()),
            ..Default::default()
        };
        assert_eq!(movie.year(), Some("1999"));
    }

    #[test]
    fn test_year_missing() {
        assert_eq!(MovieMetadata::default().year(), None);

        let empty = MovieMetadata {
            release_date: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.year(), None);
    }
}

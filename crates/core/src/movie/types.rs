//! Movie records built from grouped torrents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::external_catalog::MovieMetadata;
use crate::torrent::{QualityFlags, Torrent};

/// A logical movie: one record per grouping key across all trackers.
///
/// Tracker-derived fields (`search_name`, `year`, `quality`,
/// `last_time_found`) are filled during aggregation; the remaining fields
/// stay empty until enrichment accepts a metadata match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieShort {
    /// Grouping key the record was built from.
    pub key: String,
    /// Title used to look the movie up in the metadata source.
    pub search_name: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub quality: QualityFlags,
    /// Most recent publication date among contributing torrents.
    pub last_time_found: DateTime<Utc>,

    /// Stable id in the metadata source.
    #[serde(default)]
    pub external_id: Option<u32>,
    /// Canonical (localized) title. Empty until matched.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
}

impl MovieShort {
    /// Create an unreconciled, unmatched record.
    pub fn new(
        key: impl Into<String>,
        search_name: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            search_name: search_name.into(),
            year: year.into(),
            quality: QualityFlags::default(),
            last_time_found: DateTime::<Utc>::MIN_UTC,
            external_id: None,
            title: String::new(),
            original_title: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: None,
            vote_count: None,
        }
    }

    /// Fold contributing torrents into the record.
    ///
    /// Quality flags are unioned. The timestamp becomes the latest publication
    /// date; torrents with a missing or unparseable date count as `now`.
    pub fn reconcile(&mut self, torrents: &[Torrent], now: DateTime<Utc>) {
        for torrent in torrents {
            self.quality.merge(&torrent.quality);
            let found = torrent.published_at().unwrap_or(now);
            if found > self.last_time_found {
                self.last_time_found = found;
            }
        }
    }

    /// Whether enrichment accepted a metadata match.
    pub fn is_matched(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Overwrite the metadata fields with an accepted match.
    pub fn apply_metadata(&mut self, metadata: MovieMetadata) {
        self.external_id = Some(metadata.id);
        self.title = metadata.title;
        self.original_title = metadata.original_title;
        self.poster_path = metadata.poster_path;
        self.backdrop_path = metadata.backdrop_path;
        self.release_date = metadata.release_date;
        self.vote_average = metadata.vote_average;
        self.vote_count = metadata.vote_count;
    }
}

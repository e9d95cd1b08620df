//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing full pipeline runs without trackers, a catalog or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use moviestracker_core::testing::{fixtures, MockMetadataSource, MockTracker};
//!
//! let rutor = MockTracker::new(TrackerKind::Rutor);
//! rutor.set_page("rutorURL", vec![fixtures::torrent("Dune", "2021", "abc")]);
//!
//! let metadata = MockMetadataSource::new()
//!     .with_movie("Dune", fixtures::metadata(438631, "Дюна", "Dune", "2021-09-15"));
//!
//! // Register the tracker and run a TrackersPipeline...
//! ```

mod mock_metadata_source;
mod mock_movie_store;
mod mock_tracker;

pub use mock_metadata_source::{MockMetadataSource, RecordedLookup};
pub use mock_movie_store::MockMovieStore;
pub use mock_tracker::{MockTracker, RecordedPageRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::external_catalog::MovieMetadata;
    use crate::movie::MovieShort;
    use crate::torrent::{content_hash, QualityFlags, Torrent};

    /// Create a test torrent for an original-language title.
    pub fn torrent(title: &str, year: &str, info_hash: &str) -> Torrent {
        Torrent {
            name: format!("{} ({}) WEB-DL 1080p", title, year),
            details_url: format!("https://tracker.example/torrent/{}", info_hash),
            original_name: title.to_string(),
            localized_name: String::new(),
            year: year.to_string(),
            size_bytes: 1024 * 1024 * 1024 * 4, // 4 GB
            seeders: 50,
            leechers: 10,
            magnet: format!("magnet:?xt=urn:btih:{}", info_hash),
            info_hash: info_hash.to_string(),
            date: "2024-02-01T10:00:00.000Z".to_string(),
            quality: QualityFlags {
                full_hd: true,
                ..Default::default()
            },
            content_hash: content_hash("", title, year),
        }
    }

    /// Create test catalog metadata.
    pub fn metadata(
        id: u32,
        title: &str,
        original_title: &str,
        release_date: &str,
    ) -> MovieMetadata {
        MovieMetadata {
            id,
            title: title.to_string(),
            original_title: original_title.to_string(),
            release_date: Some(release_date.to_string()),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: Some(format!("/backdrop-{}.jpg", id)),
            vote_average: Some(7.0),
            vote_count: Some(1000),
        }
    }

    /// Create a movie that already went through enrichment.
    pub fn matched_movie(id: u32, title: &str) -> MovieShort {
        let mut movie = MovieShort::new(format!("key-{}", id), title, "2024");
        movie.last_time_found = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        movie.apply_metadata(metadata(id, title, title, "2024-01-01"));
        movie
    }
}

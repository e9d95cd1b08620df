//! Movie persistence.
//!
//! Enriched movies are written once per run. Movies are keyed by their
//! external catalog id, so a movie found again on a later run replaces the
//! earlier row.

mod sqlite;

pub use sqlite::SqliteMovieStore;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::movie::MovieShort;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Movie {0} has no external id")]
    MissingId(String),
}

/// Trait for movie storage.
pub trait MovieStore: Send + Sync {
    /// Insert or replace a matched movie.
    fn write(&self, movie: &MovieShort) -> Result<(), StoreError>;

    /// Get a movie by external id.
    fn get(&self, external_id: u32) -> Result<Option<MovieShort>, StoreError>;

    /// Number of stored movies.
    fn count(&self) -> Result<u64, StoreError>;

    /// Delete movies last found before `cutoff`. Returns how many were removed.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}

//! Mock movie store for testing.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::movie::MovieShort;
use crate::store::{MovieStore, StoreError};

/// In-memory implementation of the MovieStore trait.
///
/// Writes for ids registered with [`fail_writes_for`](Self::fail_writes_for)
/// fail with a database error.
#[derive(Debug, Clone, Default)]
pub struct MockMovieStore {
    movies: Arc<RwLock<BTreeMap<u32, MovieShort>>>,
    failing_ids: Arc<RwLock<HashSet<u32>>>,
}

impl MockMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes of the movie with `external_id` fail.
    pub fn fail_writes_for(&self, external_id: u32) {
        self.failing_ids.write().unwrap().insert(external_id);
    }

    /// Stored movies ordered by external id.
    pub fn written(&self) -> Vec<MovieShort> {
        self.movies.read().unwrap().values().cloned().collect()
    }

    /// Seed a movie without going through `write`.
    pub fn insert(&self, movie: MovieShort) {
        if let Some(id) = movie.external_id {
            self.movies.write().unwrap().insert(id, movie);
        }
    }
}

impl MovieStore for MockMovieStore {
    fn write(&self, movie: &MovieShort) -> Result<(), StoreError> {
        let id = movie
            .external_id
            .ok_or_else(|| StoreError::MissingId(movie.key.clone()))?;
        if self.failing_ids.read().unwrap().contains(&id) {
            return Err(StoreError::Database(format!("write of movie {} failed", id)));
        }
        self.movies.write().unwrap().insert(id, movie.clone());
        Ok(())
    }

    fn get(&self, external_id: u32) -> Result<Option<MovieShort>, StoreError> {
        Ok(self.movies.read().unwrap().get(&external_id).cloned())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.movies.read().unwrap().len() as u64)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut movies = self.movies.write().unwrap();
        let before = movies.len();
        movies.retain(|_, m| m.last_time_found >= cutoff);
        Ok((before - movies.len()) as u64)
    }
}

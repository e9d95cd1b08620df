//! SQLite-backed movie store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{MovieStore, StoreError};
use crate::movie::MovieShort;
use crate::torrent::QualityFlags;

/// SQLite-backed movie store.
pub struct SqliteMovieStore {
    conn: Mutex<Connection>,
}

impl SqliteMovieStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per catalog movie
            CREATE TABLE IF NOT EXISTS movies (
                external_id INTEGER PRIMARY KEY,
                grouping_key TEXT NOT NULL,
                search_name TEXT NOT NULL,
                year TEXT NOT NULL,
                title TEXT NOT NULL,
                original_title TEXT NOT NULL,
                quality TEXT NOT NULL,
                last_time_found TEXT NOT NULL,
                poster_path TEXT,
                backdrop_path TEXT,
                release_date TEXT,
                vote_average REAL,
                vote_count INTEGER,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_movies_last_time_found ON movies(last_time_found);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_movie(row: &rusqlite::Row) -> rusqlite::Result<MovieShort> {
        let quality_json: String = row.get(6)?;
        let last_found_str: String = row.get(7)?;

        let quality: QualityFlags = serde_json::from_str(&quality_json).unwrap_or_default();
        let last_time_found = DateTime::parse_from_rfc3339(&last_found_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let external_id: u32 = row.get(0)?;
        let mut movie = MovieShort::new(
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        );
        movie.external_id = Some(external_id);
        movie.title = row.get(4)?;
        movie.original_title = row.get(5)?;
        movie.quality = quality;
        movie.last_time_found = last_time_found;
        movie.poster_path = row.get(8)?;
        movie.backdrop_path = row.get(9)?;
        movie.release_date = row.get(10)?;
        movie.vote_average = row.get::<_, Option<f64>>(11)?.map(|v| v as f32);
        movie.vote_count = row.get(12)?;
        Ok(movie)
    }
}

/// Fixed-width timestamp so stored dates compare correctly as text.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MovieStore for SqliteMovieStore {
    fn write(&self, movie: &MovieShort) -> Result<(), StoreError> {
        let external_id = movie
            .external_id
            .ok_or_else(|| StoreError::MissingId(movie.key.clone()))?;
        let quality =
            serde_json::to_string(&movie.quality).map_err(|e| StoreError::Database(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO movies (
                external_id, grouping_key, search_name, year, title, original_title,
                quality, last_time_found, poster_path, backdrop_path, release_date,
                vote_average, vote_count, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(external_id) DO UPDATE SET
                grouping_key = excluded.grouping_key,
                search_name = excluded.search_name,
                year = excluded.year,
                title = excluded.title,
                original_title = excluded.original_title,
                quality = excluded.quality,
                last_time_found = excluded.last_time_found,
                poster_path = excluded.poster_path,
                backdrop_path = excluded.backdrop_path,
                release_date = excluded.release_date,
                vote_average = excluded.vote_average,
                vote_count = excluded.vote_count,
                updated_at = excluded.updated_at
            "#,
            params![
                external_id,
                movie.key,
                movie.search_name,
                movie.year,
                movie.title,
                movie.original_title,
                quality,
                format_timestamp(movie.last_time_found),
                movie.poster_path,
                movie.backdrop_path,
                movie.release_date,
                movie.vote_average.map(f64::from),
                movie.vote_count,
                format_timestamp(Utc::now()),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get(&self, external_id: u32) -> Result<Option<MovieShort>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT external_id, grouping_key, search_name, year, title, original_title,
                    quality, last_time_found, poster_path, backdrop_path, release_date,
                    vote_average, vote_count
             FROM movies WHERE external_id = ?",
            params![external_id],
            Self::row_to_movie,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count as u64)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM movies WHERE last_time_found < ?",
                params![format_timestamp(cutoff)],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(removed as u64)
    }
}

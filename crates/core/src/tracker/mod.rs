//! Tracker parsers and the registry that maps source URLs to them.
//!
//! A tracker parser turns one listing page into torrents. Parsers are
//! registered by identity in a [`TrackerRegistry`]; the orchestrator resolves
//! each configured source URL to a parser and runs one worker stage per
//! tracker.

mod jackett;
mod registry;

pub use jackett::JackettTracker;
pub use registry::TrackerRegistry;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::torrent::Torrent;

/// Tracker identities known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    Rutor,
    Kinozal,
}

impl TrackerKind {
    pub const ALL: [TrackerKind; 2] = [TrackerKind::Rutor, TrackerKind::Kinozal];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerKind::Rutor => "rutor",
            TrackerKind::Kinozal => "kinozal",
        }
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of listing page to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    Movie,
    Series,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => f.write_str("movie"),
            ContentKind::Series => f.write_str("series"),
        }
    }
}

/// Errors from fetching or parsing a tracker page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse {url}: {message}")]
    Parse { url: String, message: String },

    #[error("no tracker registered for {0}")]
    UnknownTracker(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl TrackerError {
    /// Cancellation is an expected way for a run to stop and is not reported.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TrackerError::Cancelled)
    }
}

/// A site parser for one tracker.
#[async_trait]
pub trait TrackerParser: Send + Sync {
    /// Identity used to resolve source URLs.
    fn kind(&self) -> TrackerKind;

    /// Parse a page of movie listings.
    async fn parse_movie_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError>;

    /// Parse a page of series listings.
    async fn parse_series_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError>;

    /// Parse a page of the given kind.
    async fn parse_page(
        &self,
        content: ContentKind,
        url: &str,
    ) -> Result<Vec<Torrent>, TrackerError> {
        match content {
            ContentKind::Movie => self.parse_movie_page(url).await,
            ContentKind::Series => self.parse_series_page(url).await,
        }
    }
}

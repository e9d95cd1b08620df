//! Types for the tracker pipeline.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::external_catalog::ExternalCatalogError;
use crate::movie::MovieShort;
use crate::store::StoreError;
use crate::tracker::TrackerError;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Searching,
    Deduplicating,
    Aggregating,
    Enriching,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Searching => "searching",
            RunPhase::Deduplicating => "deduplicating",
            RunPhase::Aggregating => "aggregating",
            RunPhase::Enriching => "enriching",
            RunPhase::Persisting => "persisting",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Errors recorded during a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input that prevents the run from starting.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A tracker page failed.
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// A metadata lookup failed.
    #[error("enrichment error: {0}")]
    Enrichment(#[from] ExternalCatalogError),

    /// A movie could not be persisted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The combined error a failed run reports.
///
/// Messages are distinct and kept in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(",\n"))]
pub struct RunError {
    pub messages: Vec<String>,
}

impl RunError {
    pub fn from_errors(errors: &[PipelineError]) -> Self {
        let mut messages: Vec<String> = Vec::with_capacity(errors.len());
        for message in errors.iter().map(|e| e.to_string()) {
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
        Self { messages }
    }

    pub fn cancelled() -> Self {
        Self {
            messages: vec!["run cancelled".to_string()],
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Torrents left after deduplication.
    pub torrents: usize,
    /// Movies that survived enrichment.
    pub movies: Vec<MovieShort>,
    /// Movies written to the store.
    pub persisted: usize,
    /// Stale movies pruned from the store.
    pub pruned: u64,
    pub duration: Duration,
}

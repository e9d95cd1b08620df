//! Tracker pipeline orchestration.
//!
//! A run goes through its stages in order:
//! - **Search**: concurrent per-tracker stages, merged and deduplicated
//! - **Aggregate**: torrents grouped into movies
//! - **Enrich**: concurrent metadata lookups; unmatched movies are dropped
//! - **Persist**: matched movies written to the store

mod config;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use runner::TrackersPipeline;
pub use types::{PipelineError, RunError, RunPhase, RunSummary};

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Worker stages (items processed by outcome)
//! - Tracker search (pages fetched, torrents before/after dedup)
//! - Enrichment and persistence (movies accepted, dropped, written)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Worker Stages
// =============================================================================

/// Items completed by worker stages.
pub static STAGE_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviestracker_stage_items_total",
            "Total items completed by worker stages",
        ),
        &["stage", "outcome"], // outcome: "ok", "error"
    )
    .unwrap()
});

// =============================================================================
// Tracker Search
// =============================================================================

/// Tracker pages fetched by tracker and result.
pub static TRACKER_PAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("moviestracker_tracker_pages_total", "Total tracker pages fetched"),
        &["tracker", "result"], // result: "success", "failure"
    )
    .unwrap()
});

/// Torrents collected before deduplication.
pub static TORRENTS_COLLECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "moviestracker_torrents_collected_total",
        "Torrents returned by trackers before deduplication",
    )
    .unwrap()
});

/// Torrents kept after deduplication.
pub static TORRENTS_UNIQUE: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "moviestracker_torrents_unique_total",
        "Torrents kept after deduplication",
    )
    .unwrap()
});

// =============================================================================
// Enrichment & Persistence
// =============================================================================

/// Movies after enrichment by outcome.
pub static MOVIES_ENRICHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviestracker_movies_enriched_total",
            "Movies processed by enrichment",
        ),
        &["outcome"], // "accepted", "dropped"
    )
    .unwrap()
});

/// Movies written to the store by result.
pub static MOVIES_PERSISTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("moviestracker_movies_persisted_total", "Movies written to the store"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Duration of a full pipeline run.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "moviestracker_run_duration_seconds",
            "Duration of pipeline runs",
        )
        .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(STAGE_ITEMS.clone()),
        Box::new(TRACKER_PAGES.clone()),
        Box::new(TORRENTS_COLLECTED.clone()),
        Box::new(TORRENTS_UNIQUE.clone()),
        Box::new(MOVIES_ENRICHED.clone()),
        Box::new(MOVIES_PERSISTED.clone()),
        Box::new(RUN_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        STAGE_ITEMS.with_label_values(&["test", "ok"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "moviestracker_stage_items_total"));
    }
}

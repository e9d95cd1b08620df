//! Prometheus metrics for one invocation of the runner.
//!
//! The runner is a one-shot process, so metrics are written to a textfile
//! for a node exporter to pick up instead of being served over HTTP.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{self, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Runs by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("moviestracker_runs_total", "Total pipeline runs"),
        &["result"], // result: "success", "failure", "cancelled"
    )
    .unwrap()
});

/// Unix time the last run finished.
pub static LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "moviestracker_last_run_timestamp_seconds",
        "Unix time the last pipeline run finished",
    )
    .unwrap()
});

/// Movies produced by the last successful run.
pub static LAST_RUN_MOVIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "moviestracker_last_run_movies",
        "Movies produced by the last successful run",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(RUNS_TOTAL.clone())).unwrap();
    registry
        .register(Box::new(LAST_RUN_TIMESTAMP.clone()))
        .unwrap();
    registry.register(Box::new(LAST_RUN_MOVIES.clone())).unwrap();

    // Core metrics (stages, trackers, enrichment, store)
    for metric in moviestracker_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Write all metrics to `path`, replacing it atomically.
pub fn write_textfile(path: &Path) -> Result<()> {
    let output = encode_metrics()?;
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, output).with_context(|| format!("Failed to write {:?}", tmp))?;
    std::fs::rename(&tmp, path).with_context(|| format!("Failed to move metrics to {:?}", path))?;
    Ok(())
}

mod metrics;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviestracker_core::{
    load_config, validate_config, Config, JackettTracker, MetadataSource, MovieStore,
    PipelineConfig, RunError, SanitizedConfig, SqliteMovieStore, TmdbClient, TrackerKind,
    TrackerRegistry, TrackersPipeline,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(version = VERSION, "Starting moviestracker");

    // Determine config path
    let config_path = std::env::var("MOVIESTRACKER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        config = %serde_json::to_string(&sanitized).unwrap_or_default(),
        "Configuration loaded"
    );

    let registry = build_registry(&config)?;
    let metadata = build_metadata_source(&config)?;
    let store = build_store(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let mut pipeline = TrackersPipeline::new(PipelineConfig::from(&config), registry, metadata)
        .with_cancellation(cancel);
    if let Some(store) = store {
        pipeline = pipeline.with_store(store);
    }
    let run_id = pipeline.run_id();

    let result = pipeline.run(config.search.kind).await;
    metrics::LAST_RUN_TIMESTAMP.set(chrono::Utc::now().timestamp());

    let outcome = match result {
        Ok(summary) => {
            metrics::RUNS_TOTAL.with_label_values(&["success"]).inc();
            metrics::LAST_RUN_MOVIES.set(summary.movies.len() as i64);
            for movie in &summary.movies {
                info!(
                    id = movie.external_id.unwrap_or_default(),
                    title = %movie.title,
                    original_title = %movie.original_title,
                    year = %movie.year,
                    uhd = movie.quality.uhd,
                    hdr = movie.quality.hdr,
                    "Movie"
                );
            }
            info!(
                %run_id,
                torrents = summary.torrents,
                movies = summary.movies.len(),
                persisted = summary.persisted,
                pruned = summary.pruned,
                duration_ms = summary.duration.as_millis() as u64,
                "Run finished"
            );
            Ok(())
        }
        Err(err) if err == RunError::cancelled() => {
            metrics::RUNS_TOTAL.with_label_values(&["cancelled"]).inc();
            warn!(%run_id, "Run cancelled");
            Err(anyhow::Error::new(err))
        }
        Err(err) => {
            metrics::RUNS_TOTAL.with_label_values(&["failure"]).inc();
            Err(anyhow::Error::new(err).context("Pipeline run failed"))
        }
    };

    if let Some(path) = &config.metrics.textfile {
        match metrics::write_textfile(path) {
            Ok(()) => info!("Metrics written to {:?}", path),
            Err(e) => warn!("Failed to write metrics: {:#}", e),
        }
    }

    outcome
}

/// One Jackett-backed parser per supported tracker.
fn build_registry(config: &Config) -> Result<TrackerRegistry> {
    let Some(jackett) = &config.jackett else {
        bail!("jackett must be configured to fetch tracker pages");
    };

    let mut registry = TrackerRegistry::new();
    for kind in TrackerKind::ALL {
        let tracker = JackettTracker::new(kind, jackett)
            .with_context(|| format!("Failed to create {} tracker", kind))?;
        registry.register(Arc::new(tracker));
    }
    info!(trackers = ?registry.kinds(), "Trackers registered");
    Ok(registry)
}

fn build_metadata_source(config: &Config) -> Result<Arc<dyn MetadataSource>> {
    let Some(tmdb) = &config.tmdb else {
        bail!("tmdb must be configured to enrich movies");
    };
    let client = TmdbClient::new(tmdb.clone()).context("Failed to create TMDB client")?;
    info!(language = %tmdb.language, "TMDB client initialized");
    Ok(Arc::new(client))
}

fn build_store(config: &Config) -> Result<Option<Arc<dyn MovieStore>>> {
    if !config.database.persist {
        info!("Persistence disabled");
        return Ok(None);
    }
    let store = SqliteMovieStore::new(&config.database.path)
        .with_context(|| format!("Failed to open movie store at {:?}", config.database.path))?;
    info!("Movie store initialized at {:?}", config.database.path);
    Ok(Some(Arc::new(store)))
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn cancel_on_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested, cancelling run");
    token.cancel();
}

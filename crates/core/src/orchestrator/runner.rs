//! Tracker pipeline implementation.
//!
//! Drives one run through its stages:
//! - Search: one bounded worker stage per tracker, merged and deduplicated
//! - Aggregate: group torrents into movies (sequential, deterministic)
//! - Enrich: one bounded worker stage of metadata lookups
//! - Persist: write matched movies and prune stale ones

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::external_catalog::{enrich_movie, MetadataSource};
use crate::metrics;
use crate::movie::{self, MovieShort};
use crate::pipeline::{collect, drain, merge, source_stream, StageOutput, WorkerStage};
use crate::store::MovieStore;
use crate::torrent::{remove_duplicates, Torrent};
use crate::tracker::{ContentKind, TrackerError, TrackerRegistry};

use super::config::PipelineConfig;
use super::types::{PipelineError, RunError, RunPhase, RunSummary};

/// One run of the tracker pipeline.
///
/// Stages consume and return the pipeline so they chain:
///
/// ```ignore
/// let summary = TrackersPipeline::new(config, registry, metadata)
///     .with_store(store)
///     .search_trackers(ContentKind::Movie)
///     .await
///     .aggregate_movies()
///     .enrich()
///     .await
///     .persist()
///     .await
///     .finish()?;
/// ```
///
/// A stage is skipped once the run has recorded an error or was cancelled.
pub struct TrackersPipeline {
    config: PipelineConfig,
    registry: TrackerRegistry,
    metadata: Arc<dyn MetadataSource>,
    store: Option<Arc<dyn MovieStore>>,
    cancel: CancellationToken,

    run_id: Uuid,
    span: Span,
    started: Instant,

    // Run state
    phase: RunPhase,
    torrents: Vec<Torrent>,
    movies: Vec<MovieShort>,
    errors: Vec<PipelineError>,
    persisted: usize,
    pruned: u64,
}

impl TrackersPipeline {
    /// Create a new run.
    pub fn new(
        config: PipelineConfig,
        registry: TrackerRegistry,
        metadata: Arc<dyn MetadataSource>,
    ) -> Self {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id);

        Self {
            config,
            registry,
            metadata,
            store: None,
            cancel: CancellationToken::new(),
            run_id,
            span,
            started: Instant::now(),
            phase: RunPhase::Idle,
            torrents: Vec::new(),
            movies: Vec::new(),
            errors: Vec::new(),
            persisted: 0,
            pruned: 0,
        }
    }

    /// Store used by [`persist`](Self::persist).
    pub fn with_store(mut self, store: Arc<dyn MovieStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `token` as the run-level cancellation signal. Every stage runs on
    /// a child of it.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Deduplicated torrents from the search stage.
    pub fn torrents(&self) -> &[Torrent] {
        &self.torrents
    }

    pub fn movies(&self) -> &[MovieShort] {
        &self.movies
    }

    pub fn errors(&self) -> &[PipelineError] {
        &self.errors
    }

    /// Run every stage once. Persistence only runs when a store is set.
    pub async fn run(self, kind: ContentKind) -> Result<RunSummary, RunError> {
        let pipeline = self.search_trackers(kind).await.aggregate_movies().enrich().await;
        if pipeline.store.is_some() {
            pipeline.persist().await.finish()
        } else {
            pipeline.finish()
        }
    }

    /// Fetch every source URL with its tracker's parser and deduplicate the
    /// combined torrents.
    pub async fn search_trackers(self, kind: ContentKind) -> Self {
        let span = self.span.clone();
        self.search_trackers_inner(kind).instrument(span).await
    }

    async fn search_trackers_inner(mut self, kind: ContentKind) -> Self {
        if self.should_skip(RunPhase::Searching) {
            return self;
        }

        let url_count = self.config.urls.len();
        if url_count < 2 {
            self.fail(PipelineError::Validation(format!(
                "at least two source urls are required, got {}",
                url_count
            )));
            return self;
        }

        let groups = match self.registry.group_urls(&self.config.urls) {
            Ok(groups) => groups,
            Err(e) => {
                self.fail(PipelineError::Validation(e.to_string()));
                return self;
            }
        };

        info!(urls = url_count, trackers = groups.len(), kind = %kind, "Searching trackers");

        let stage_cancel = self.cancel.child_token();
        let mut result_streams = Vec::with_capacity(groups.len());
        let mut error_streams = Vec::with_capacity(groups.len());

        for (parser, urls) in groups {
            let stage = WorkerStage::new(
                format!("tracker_{}", parser.kind()),
                self.config.tracker_concurrency,
            );
            debug!(
                tracker = %parser.kind(),
                pages = urls.len(),
                limit = stage.limit(),
                "Starting tracker stage"
            );

            let cancel = stage_cancel.clone();
            let output = stage.spawn(stage_cancel.clone(), source_stream(urls), move |url: String| {
                let parser = Arc::clone(&parser);
                let cancel = cancel.clone();
                async move {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => Err(TrackerError::Cancelled),
                        result = parser.parse_page(kind, &url) => result,
                    }
                }
            });

            result_streams.push(output.results);
            error_streams.push(output.errors);
        }

        let merged = StageOutput {
            results: merge(stage_cancel.clone(), result_streams),
            errors: merge(stage_cancel.clone(), error_streams),
        };
        let drained = collect(merged).await;

        for err in drained.errors {
            if err.is_cancelled() {
                continue;
            }
            warn!(error = %err, "Tracker page failed");
            self.errors.push(PipelineError::Tracker(err));
        }

        let collected: Vec<Torrent> = drained.items.into_iter().flatten().collect();

        self.phase = RunPhase::Deduplicating;
        let before = collected.len();
        self.torrents = remove_duplicates(collected);
        metrics::TORRENTS_COLLECTED.inc_by(before as u64);
        metrics::TORRENTS_UNIQUE.inc_by(self.torrents.len() as u64);

        info!(
            collected = before,
            unique = self.torrents.len(),
            errors = self.errors.len(),
            "Tracker search complete"
        );

        self.complete_stage();
        self
    }

    /// Group the run's torrents into movies.
    pub fn aggregate_movies(mut self) -> Self {
        let span = self.span.clone();
        span.in_scope(|| {
            if self.should_skip(RunPhase::Aggregating) {
                return;
            }

            self.movies = movie::aggregate_movies(self.torrents.clone());
            info!(
                torrents = self.torrents.len(),
                movies = self.movies.len(),
                "Aggregated movies"
            );
            self.complete_stage();
        });
        self
    }

    /// Look every movie up in the metadata source and keep the matched ones.
    pub async fn enrich(self) -> Self {
        let span = self.span.clone();
        self.enrich_inner().instrument(span).await
    }

    async fn enrich_inner(mut self) -> Self {
        if self.should_skip(RunPhase::Enriching) {
            return self;
        }

        let stage = WorkerStage::new("enrichment", self.config.enrichment_concurrency);
        let stage_cancel = self.cancel.child_token();
        let total = self.movies.len();
        info!(movies = total, limit = stage.limit(), "Enriching movies");

        let metadata = Arc::clone(&self.metadata);
        let output = stage.spawn(
            stage_cancel.clone(),
            source_stream(std::mem::take(&mut self.movies)),
            move |movie: MovieShort| {
                let metadata = Arc::clone(&metadata);
                async move { enrich_movie(metadata.as_ref(), movie).await }
            },
        );
        let drained = drain(&stage_cancel, output).await;

        if let Some(err) = drained.errors.into_iter().next() {
            warn!(error = %err, "Enrichment failed");
            self.fail(PipelineError::Enrichment(err));
        }

        let (matched, dropped): (Vec<_>, Vec<_>) =
            drained.items.into_iter().partition(MovieShort::is_matched);
        metrics::MOVIES_ENRICHED
            .with_label_values(&["accepted"])
            .inc_by(matched.len() as u64);
        metrics::MOVIES_ENRICHED
            .with_label_values(&["dropped"])
            .inc_by(dropped.len() as u64);

        for movie in &dropped {
            debug!(title = %movie.search_name, year = %movie.year, "Dropping unmatched movie");
        }
        info!(
            movies = total,
            matched = matched.len(),
            dropped = dropped.len(),
            "Enrichment complete"
        );

        self.movies = matched;
        self.complete_stage();
        self
    }

    /// Write every movie to the store, then prune stale ones.
    ///
    /// A failed write does not stop the others; each failure is recorded.
    pub async fn persist(self) -> Self {
        let span = self.span.clone();
        self.persist_inner().instrument(span).await
    }

    async fn persist_inner(mut self) -> Self {
        if self.should_skip(RunPhase::Persisting) {
            return self;
        }

        let Some(store) = self.store.clone() else {
            self.fail(PipelineError::Validation(
                "no movie store configured".to_string(),
            ));
            return self;
        };

        let mut failures = Vec::new();
        for movie in &self.movies {
            match store.write(movie) {
                Ok(()) => {
                    self.persisted += 1;
                    metrics::MOVIES_PERSISTED.with_label_values(&["success"]).inc();
                }
                Err(e) => {
                    warn!(title = %movie.title, error = %e, "Failed to persist movie");
                    metrics::MOVIES_PERSISTED.with_label_values(&["failure"]).inc();
                    failures.push(PipelineError::Store(e));
                }
            }
        }
        self.errors.extend(failures);

        if self.config.retention_days > 0 {
            let cutoff = Utc::now() - chrono::Duration::days(self.config.retention_days as i64);
            match store.prune_older_than(cutoff) {
                Ok(pruned) => {
                    self.pruned = pruned;
                    if pruned > 0 {
                        info!(pruned, cutoff = %cutoff, "Pruned stale movies");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to prune stale movies");
                    self.errors.push(PipelineError::Store(e));
                }
            }
        }

        info!(persisted = self.persisted, failed = self.errors.len(), "Persistence complete");
        self.complete_stage();
        self
    }

    /// End the run and report its outcome.
    pub fn finish(self) -> Result<RunSummary, RunError> {
        let _entered = self.span.clone().entered();
        let duration = self.started.elapsed();

        if !self.errors.is_empty() {
            metrics::RUN_DURATION
                .with_label_values(&["failed"])
                .observe(duration.as_secs_f64());
            let err = RunError::from_errors(&self.errors);
            warn!(errors = err.messages.len(), "Run failed");
            return Err(err);
        }

        if self.cancel.is_cancelled() {
            metrics::RUN_DURATION
                .with_label_values(&["failed"])
                .observe(duration.as_secs_f64());
            info!("Run cancelled");
            return Err(RunError::cancelled());
        }

        metrics::RUN_DURATION
            .with_label_values(&["success"])
            .observe(duration.as_secs_f64());
        info!(
            torrents = self.torrents.len(),
            movies = self.movies.len(),
            persisted = self.persisted,
            duration_ms = duration.as_millis() as u64,
            "Run complete"
        );

        Ok(RunSummary {
            run_id: self.run_id,
            torrents: self.torrents.len(),
            movies: self.movies,
            persisted: self.persisted,
            pruned: self.pruned,
            duration,
        })
    }

    /// Enter `phase` unless earlier errors or cancellation end the run here.
    fn should_skip(&mut self, phase: RunPhase) -> bool {
        if !self.errors.is_empty() {
            debug!(stage = %phase, "Skipping stage after earlier errors");
            return true;
        }
        if self.cancel.is_cancelled() {
            debug!(stage = %phase, "Skipping stage, run cancelled");
            self.phase = RunPhase::Failed;
            return true;
        }
        self.phase = phase;
        false
    }

    fn complete_stage(&mut self) {
        self.phase = if self.errors.is_empty() && !self.cancel.is_cancelled() {
            RunPhase::Done
        } else {
            RunPhase::Failed
        };
    }

    fn fail(&mut self, err: PipelineError) {
        warn!(error = %err, phase = %self.phase, "Run failed");
        self.errors.push(err);
        self.phase = RunPhase::Failed;
    }
}

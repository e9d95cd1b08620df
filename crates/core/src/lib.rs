pub mod config;
pub mod external_catalog;
pub mod metrics;
pub mod movie;
pub mod orchestrator;
pub mod pipeline;
pub mod store;
pub mod testing;
pub mod torrent;
pub mod tracker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, JackettConfig,
    SanitizedConfig,
};
pub use external_catalog::{MetadataSource, MovieMetadata, TmdbClient, TmdbConfig};
pub use movie::MovieShort;
pub use orchestrator::{PipelineConfig, RunError, RunSummary, TrackersPipeline};
pub use store::{MovieStore, SqliteMovieStore};
pub use torrent::Torrent;
pub use tracker::{ContentKind, JackettTracker, TrackerKind, TrackerParser, TrackerRegistry};

//! Pipeline run configuration.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source URLs to fetch. At least two are required.
    #[serde(default)]
    pub urls: Vec<String>,

    /// Pages fetched concurrently per tracker.
    /// Zero is treated as one.
    #[serde(default = "default_tracker_concurrency")]
    pub tracker_concurrency: usize,

    /// Concurrent metadata lookups during enrichment.
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,

    /// Prune stored movies not found for this many days (0 = never).
    #[serde(default)]
    pub retention_days: u32,
}

fn default_tracker_concurrency() -> usize {
    3
}

fn default_enrichment_concurrency() -> usize {
    20
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            tracker_concurrency: default_tracker_concurrency(),
            enrichment_concurrency: default_enrichment_concurrency(),
            retention_days: 0,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            urls: config.source_urls(),
            tracker_concurrency: config.search.tracker_concurrency,
            enrichment_concurrency: config.enrichment.concurrency,
            retention_days: config.database.retention_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.urls.is_empty());
        assert_eq!(config.tracker_concurrency, 3);
        assert_eq!(config.enrichment_concurrency, 20);
        assert_eq!(config.retention_days, 0);
    }

    #[test]
    fn test_from_app_config() {
        let toml = r#"
[search]
urls = ["http://rutor.example/1", "http://kinozal.example/1"]
tracker_concurrency = 2

[enrichment]
concurrency = 5
"#;
        let app = load_config_from_str(toml).unwrap();
        let config = PipelineConfig::from(&app);

        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.tracker_concurrency, 2);
        assert_eq!(config.enrichment_concurrency, 5);
        assert_eq!(config.retention_days, 365);
    }
}

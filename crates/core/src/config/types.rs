use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::external_catalog::TmdbConfig;
use crate::tracker::{ContentKind, TrackerKind};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Every source URL a run should fetch.
    ///
    /// Explicit `search.urls` come first, followed by one Jackett results URL
    /// per configured query and tracker.
    pub fn source_urls(&self) -> Vec<String> {
        let mut urls = self.search.urls.clone();
        if let Some(jackett) = &self.jackett {
            for query in &self.search.queries {
                for tracker in TrackerKind::ALL {
                    urls.push(jackett.results_url(tracker, query, self.search.kind));
                }
            }
        }
        urls
    }
}

/// Tracker search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Listing kind to parse (default: movie)
    #[serde(default)]
    pub kind: ContentKind,
    /// Source URLs fetched as-is
    #[serde(default)]
    pub urls: Vec<String>,
    /// Queries expanded into Jackett results URLs for every tracker
    #[serde(default)]
    pub queries: Vec<String>,
    /// Pages fetched concurrently per tracker (default: 3)
    #[serde(default = "default_tracker_concurrency")]
    pub tracker_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            kind: ContentKind::default(),
            urls: Vec::new(),
            queries: Vec::new(),
            tracker_concurrency: default_tracker_concurrency(),
        }
    }
}

fn default_tracker_concurrency() -> usize {
    3
}

/// Metadata enrichment configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Concurrent metadata lookups (default: 20)
    #[serde(default = "default_enrichment_concurrency")]
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            concurrency: default_enrichment_concurrency(),
        }
    }
}

fn default_enrichment_concurrency() -> usize {
    20
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Write enriched movies to the database (default: true)
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// Movies not seen for this many days are pruned after a run.
    /// 0 disables pruning (default: 365)
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            persist: default_persist(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("moviestracker.db")
}

fn default_persist() -> bool {
    true
}

fn default_retention_days() -> u32 {
    365
}

/// Metrics output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Write the text exposition here after each run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfile: Option<PathBuf>,
}

/// Jackett configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

impl JackettConfig {
    /// Build the Jackett results URL for one tracker and query.
    pub fn results_url(&self, tracker: TrackerKind, query: &str, kind: ContentKind) -> String {
        let category = match kind {
            ContentKind::Movie => 2000,
            ContentKind::Series => 5000,
        };
        format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}&Category[]={}",
            self.url.trim_end_matches('/'),
            tracker.as_str(),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query),
            category
        )
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub search: SanitizedSearchConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackett: Option<SanitizedJackettConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<SanitizedTmdbConfig>,
    pub enrichment: EnrichmentConfig,
    pub database: DatabaseConfig,
    pub metrics: MetricsConfig,
}

/// Search config with source URLs counted rather than listed
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub kind: ContentKind,
    pub url_count: usize,
    pub queries: Vec<String>,
    pub tracker_concurrency: usize,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub base_url: Option<String>,
    pub language: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            search: SanitizedSearchConfig {
                kind: config.search.kind,
                url_count: config.source_urls().len(),
                queries: config.search.queries.clone(),
                tracker_concurrency: config.search.tracker_concurrency,
            },
            jackett: config.jackett.as_ref().map(|j| SanitizedJackettConfig {
                url: j.url.clone(),
                api_key_configured: !j.api_key.is_empty(),
                timeout_secs: j.timeout_secs,
            }),
            tmdb: config.tmdb.as_ref().map(|t| SanitizedTmdbConfig {
                base_url: t.base_url.clone(),
                language: t.language.clone(),
                api_key_configured: !t.api_key.is_empty(),
            }),
            enrichment: config.enrichment.clone(),
            database: config.database.clone(),
            metrics: config.metrics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.kind, ContentKind::Movie);
        assert_eq!(config.search.tracker_concurrency, 3);
        assert_eq!(config.enrichment.concurrency, 20);
        assert_eq!(config.database.path.to_str().unwrap(), "moviestracker.db");
        assert!(config.database.persist);
        assert_eq!(config.database.retention_days, 365);
        assert!(config.jackett.is_none());
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[search]
kind = "series"
urls = ["http://rutor.example/browse/0/4/0/0"]
queries = ["2160p"]
tracker_concurrency = 5

[jackett]
url = "http://localhost:9117"
api_key = "test-api-key"

[tmdb]
api_key = "tmdb-key"

[enrichment]
concurrency = 8

[database]
path = "/data/movies.sqlite"
persist = false
retention_days = 30

[metrics]
textfile = "/var/lib/node_exporter/moviestracker.prom"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.search.kind, ContentKind::Series);
        assert_eq!(config.search.tracker_concurrency, 5);

        let jackett = config.jackett.as_ref().unwrap();
        assert_eq!(jackett.timeout_secs, 30); // default

        let tmdb = config.tmdb.as_ref().unwrap();
        assert_eq!(tmdb.language, "ru"); // default

        assert_eq!(config.enrichment.concurrency, 8);
        assert!(!config.database.persist);
        assert_eq!(config.database.retention_days, 30);
        assert!(config.metrics.textfile.is_some());
    }

    #[test]
    fn test_results_url() {
        let jackett = JackettConfig {
            url: "http://localhost:9117/".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 30,
        };

        let url = jackett.results_url(TrackerKind::Kinozal, "bad boys", ContentKind::Movie);
        assert_eq!(
            url,
            "http://localhost:9117/api/v2.0/indexers/kinozal/results?apikey=key&Query=bad%20boys&Category[]=2000"
        );

        let series = jackett.results_url(TrackerKind::Rutor, "x", ContentKind::Series);
        assert!(series.ends_with("Category[]=5000"));
    }

    #[test]
    fn test_source_urls_expands_queries() {
        let config = Config {
            search: SearchConfig {
                urls: vec!["http://explicit/rutor".to_string()],
                queries: vec!["q1".to_string(), "q2".to_string()],
                ..Default::default()
            },
            jackett: Some(JackettConfig {
                url: "http://jackett".to_string(),
                api_key: "k".to_string(),
                timeout_secs: 30,
            }),
            ..Default::default()
        };

        let urls = config.source_urls();
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "http://explicit/rutor");
        assert!(urls[1].contains("/indexers/rutor/") && urls[1].contains("Query=q1"));
        assert!(urls[2].contains("/indexers/kinozal/") && urls[2].contains("Query=q1"));
    }

    #[test]
    fn test_source_urls_without_jackett_ignores_queries() {
        let config = Config {
            search: SearchConfig {
                queries: vec!["q".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.source_urls().is_empty());
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let config = Config {
            jackett: Some(JackettConfig {
                url: "http://localhost:9117".to_string(),
                api_key: "secret-key".to_string(),
                timeout_secs: 60,
            }),
            tmdb: Some(TmdbConfig {
                api_key: String::new(),
                base_url: None,
                language: "en".to_string(),
                timeout_secs: 30,
            }),
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let jackett = sanitized.jackett.as_ref().unwrap();
        assert!(jackett.api_key_configured);
        assert_eq!(jackett.timeout_secs, 60);
        assert!(!sanitized.tmdb.as_ref().unwrap().api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}

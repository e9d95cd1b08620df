//! Tracker parser backed by a Jackett indexer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::JackettConfig;
use crate::metrics;
use crate::torrent::{
    content_hash, extract_info_hash, parse_listing_title, QualityFlags, Torrent,
};

use super::{ContentKind, TrackerError, TrackerKind, TrackerParser};

/// Parses Jackett results pages for one tracker.
///
/// Source URLs are Jackett results URLs for the tracker's indexer (see
/// [`JackettConfig::results_url`]). Results whose category falls outside the
/// requested content kind are dropped.
pub struct JackettTracker {
    kind: TrackerKind,
    client: Client,
}

impl JackettTracker {
    /// Create a tracker using the Jackett request timeout.
    pub fn new(kind: TrackerKind, config: &JackettConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| TrackerError::Request {
                url: config.url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { kind, client })
    }

    async fn fetch(&self, url: &str, content: ContentKind) -> Result<Vec<Torrent>, TrackerError> {
        let shown = redact(url);
        debug!(tracker = %self.kind, url = %shown, "Fetching tracker page");

        let result = self.fetch_results(url, &shown).await;
        metrics::TRACKER_PAGES
            .with_label_values(&[
                self.kind.as_str(),
                if result.is_ok() { "success" } else { "failure" },
            ])
            .inc();
        let results = result?;

        let total = results.len();
        let torrents: Vec<Torrent> = results
            .into_iter()
            .filter(|r| matches_content(r.Category.as_deref(), content))
            .map(to_torrent)
            .collect();

        debug!(
            tracker = %self.kind,
            results = total,
            kept = torrents.len(),
            "Tracker page parsed"
        );

        Ok(torrents)
    }

    async fn fetch_results(
        &self,
        url: &str,
        shown: &str,
    ) -> Result<Vec<JackettResult>, TrackerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TrackerError::Request {
                url: shown.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                url: shown.to_string(),
                status: status.as_u16(),
            });
        }

        let page: JackettResponse = response.json().await.map_err(|e| TrackerError::Parse {
            url: shown.to_string(),
            message: e.without_url().to_string(),
        })?;

        Ok(page.Results)
    }
}

#[async_trait]
impl TrackerParser for JackettTracker {
    fn kind(&self) -> TrackerKind {
        self.kind
    }

    async fn parse_movie_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError> {
        self.fetch(url, ContentKind::Movie).await
    }

    async fn parse_series_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError> {
        self.fetch(url, ContentKind::Series).await
    }
}

/// Hide the `apikey` query parameter so keys never reach logs or errors.
/// Other parameters stay visible to tell failing queries apart.
fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let params: Vec<&str> = query
        .split('&')
        .map(|param| match param.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case("apikey") => "apikey=***",
            _ => param,
        })
        .collect();
    format!("{}?{}", base, params.join("&"))
}

/// Whether reported categories fit the content kind. Results without
/// categories are kept.
fn matches_content(categories: Option<&[i32]>, content: ContentKind) -> bool {
    let range = match content {
        ContentKind::Movie => 2000..3000,
        ContentKind::Series => 5000..6000,
    };
    match categories {
        Some(cats) if !cats.is_empty() => cats.iter().any(|c| range.contains(c)),
        _ => true,
    }
}

fn to_torrent(r: JackettResult) -> Torrent {
    let title = parse_listing_title(&r.Title);
    let magnet = r.MagnetUri.unwrap_or_default();
    let info_hash = r
        .InfoHash
        .filter(|h| !h.trim().is_empty())
        .or_else(|| extract_info_hash(&magnet))
        .unwrap_or_default();
    let hash = if title.localized.is_empty() && title.original.is_empty() {
        String::new()
    } else {
        content_hash(&title.localized, &title.original, &title.year)
    };
    let seeders = r.Seeders.unwrap_or(0).max(0);

    Torrent {
        quality: QualityFlags::from_title(&r.Title),
        name: r.Title,
        details_url: r.Details.or(r.Link).unwrap_or_default(),
        original_name: title.original,
        localized_name: title.localized,
        year: title.year,
        size_bytes: r.Size.unwrap_or(0).max(0) as u64,
        seeders: seeders as u32,
        leechers: r.Peers.unwrap_or(0).saturating_sub(seeders).max(0) as u32,
        magnet,
        info_hash,
        date: r.PublishDate.unwrap_or_default(),
        content_hash: hash,
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    MagnetUri: Option<String>,
    Link: Option<String>,
    InfoHash: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i32>,
    Peers: Option<i32>,
    Category: Option<Vec<i32>>,
    PublishDate: Option<String>,
    Details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> JackettResult {
        JackettResult {
            Title: "Плохие парни до конца / Bad Boys: Ride or Die (2024) WEB-DL 2160p | HDR10+"
                .to_string(),
            MagnetUri: Some("magnet:?xt=urn:btih:ABCDEF0123&dn=bad+boys".to_string()),
            Link: Some("http://jackett/dl/1".to_string()),
            InfoHash: None,
            Size: Some(20_000_000_000),
            Seeders: Some(120),
            Peers: Some(150),
            Category: Some(vec![2000, 100_001]),
            PublishDate: Some("2024-06-20T10:00:00+03:00".to_string()),
            Details: Some("http://rutor.example/torrent/1".to_string()),
        }
    }

    #[test]
    fn test_result_conversion() {
        let torrent = to_torrent(sample_result());

        assert_eq!(torrent.localized_name, "Плохие парни до конца");
        assert_eq!(torrent.original_name, "Bad Boys: Ride or Die");
        assert_eq!(torrent.year, "2024");
        assert_eq!(torrent.info_hash, "ABCDEF0123");
        assert_eq!(torrent.seeders, 120);
        assert_eq!(torrent.leechers, 30);
        assert_eq!(torrent.details_url, "http://rutor.example/torrent/1");
        assert!(torrent.quality.uhd);
        assert!(torrent.quality.hdr10_plus && torrent.quality.hdr);
        assert_eq!(
            torrent.content_hash,
            content_hash("Плохие парни до конца", "Bad Boys: Ride or Die", "2024")
        );
        assert!(torrent.published_at().is_some());
    }

    #[test]
    fn test_result_prefers_reported_info_hash() {
        let mut result = sample_result();
        result.InfoHash = Some("feedbeef".to_string());
        assert_eq!(to_torrent(result).info_hash, "feedbeef");
    }

    #[test]
    fn test_untitled_result_has_no_content_hash() {
        let mut result = sample_result();
        result.Title = String::new();
        assert!(to_torrent(result).content_hash.is_empty());
    }

    #[test]
    fn test_matches_content() {
        assert!(matches_content(Some(&[2000, 100_001][..]), ContentKind::Movie));
        assert!(!matches_content(Some(&[5040][..]), ContentKind::Movie));
        assert!(matches_content(Some(&[5040][..]), ContentKind::Series));
        assert!(matches_content(None, ContentKind::Series));
        assert!(matches_content(Some(&[][..]), ContentKind::Movie));
    }

    #[test]
    fn test_redact_hides_only_api_key() {
        assert_eq!(
            redact("http://jackett/api/v2.0/indexers/rutor/results?apikey=secret&Query=dune"),
            "http://jackett/api/v2.0/indexers/rutor/results?apikey=***&Query=dune"
        );
        assert_eq!(
            redact("http://jackett/results?Query=bad%20boys&ApiKey=secret"),
            "http://jackett/results?Query=bad%20boys&apikey=***"
        );
        assert_eq!(redact("http://rutor.example/browse"), "http://rutor.example/browse");
    }

    #[test]
    fn test_redacted_urls_keep_queries_apart() {
        let first = redact("http://jackett/indexers/rutor/results?apikey=secret&Query=dune");
        let second = redact("http://jackett/indexers/rutor/results?apikey=secret&Query=alien");
        assert_ne!(first, second);
    }

    #[test]
    fn test_deserialize_response() {
        let json = r#"{
            "Results": [
                {"Title": "Дюна (2021) 1080p", "Seeders": 5, "Category": [2040]},
                {"Title": "Other"}
            ]
        }"#;
        let response: JackettResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.Results.len(), 2);
        assert_eq!(response.Results[0].Category, Some(vec![2040]));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let config = JackettConfig {
            url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 2,
        };
        let tracker = JackettTracker::new(TrackerKind::Rutor, &config).unwrap();

        let err = tracker
            .parse_movie_page("http://127.0.0.1:9/api/v2.0/indexers/rutor/results?apikey=secret")
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Request { .. }));
        assert!(!err.to_string().contains("secret"));
    }
}

//! Mock tracker parser for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::torrent::Torrent;
use crate::tracker::{ContentKind, TrackerError, TrackerKind, TrackerParser};

/// A recorded page request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPageRequest {
    pub url: String,
    pub content: ContentKind,
}

/// Mock implementation of the TrackerParser trait.
///
/// Provides controllable behavior for testing:
/// - Return configured torrents per page URL
/// - Fail specific pages
/// - Track requests for assertions
///
/// Clones share state, so a test can keep a handle after registering the
/// tracker.
///
/// # Example
///
/// ```rust,ignore
/// use moviestracker_core::testing::{MockTracker, fixtures};
///
/// let rutor = MockTracker::new(TrackerKind::Rutor);
/// rutor.set_page("rutorURL", vec![fixtures::torrent("Dune", "2021", "abc")]);
///
/// let torrents = rutor.parse_movie_page("rutorURL").await?;
/// assert_eq!(torrents.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTracker {
    kind: TrackerKind,
    /// Torrents by page URL. Unknown pages are empty.
    pages: Arc<RwLock<HashMap<String, Vec<Torrent>>>>,
    /// Errors by page URL.
    failures: Arc<RwLock<HashMap<String, TrackerError>>>,
    /// Artificial latency per page.
    delay: Arc<RwLock<Option<Duration>>>,
    requests: Arc<RwLock<Vec<RecordedPageRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl MockTracker {
    pub fn new(kind: TrackerKind) -> Self {
        Self {
            kind,
            pages: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve `torrents` for `url`.
    pub fn set_page(&self, url: &str, torrents: Vec<Torrent>) {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), torrents);
    }

    /// Fail every request for `url` with `error`.
    pub fn fail_page(&self, url: &str, error: TrackerError) {
        self.failures
            .write()
            .unwrap()
            .insert(url.to_string(), error);
    }

    /// Sleep this long before answering each page.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = Some(delay);
    }

    /// Number of pages requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All recorded requests.
    pub fn requests(&self) -> Vec<RecordedPageRequest> {
        self.requests.read().unwrap().clone()
    }

    async fn serve(&self, url: &str, content: ContentKind) -> Result<Vec<Torrent>, TrackerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.write().unwrap().push(RecordedPageRequest {
            url: url.to_string(),
            content,
        });

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.read().unwrap().get(url) {
            return Err(error.clone());
        }

        Ok(self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TrackerParser for MockTracker {
    fn kind(&self) -> TrackerKind {
        self.kind
    }

    async fn parse_movie_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError> {
        self.serve(url, ContentKind::Movie).await
    }

    async fn parse_series_page(&self, url: &str) -> Result<Vec<Torrent>, TrackerError> {
        self.serve(url, ContentKind::Series).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_configured_pages() {
        let tracker = MockTracker::new(TrackerKind::Rutor);
        tracker.set_page("page1", vec![fixtures::torrent("Dune", "2021", "abc")]);

        let torrents = tracker.parse_movie_page("page1").await.unwrap();
        assert_eq!(torrents.len(), 1);
        assert!(tracker.parse_movie_page("other").await.unwrap().is_empty());
        assert_eq!(tracker.calls(), 2);
    }

    #[tokio::test]
    async fn test_records_content_kind() {
        let tracker = MockTracker::new(TrackerKind::Kinozal);
        tracker
            .parse_page(ContentKind::Series, "series-page")
            .await
            .unwrap();

        assert_eq!(
            tracker.requests(),
            vec![RecordedPageRequest {
                url: "series-page".to_string(),
                content: ContentKind::Series,
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_page() {
        let tracker = MockTracker::new(TrackerKind::Rutor);
        tracker.fail_page("bad", TrackerError::Cancelled);

        let err = tracker.parse_movie_page("bad").await.unwrap_err();
        assert!(err.is_cancelled());
    }
}

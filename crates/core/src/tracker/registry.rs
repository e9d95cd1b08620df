use std::fmt;
use std::sync::Arc;

use super::{TrackerError, TrackerKind, TrackerParser};

/// Registered tracker parsers, keyed by identity.
#[derive(Default, Clone)]
pub struct TrackerRegistry {
    parsers: Vec<Arc<dyn TrackerParser>>,
}

impl fmt::Debug for TrackerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerRegistry")
            .field("trackers", &self.kinds())
            .finish()
    }
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser, replacing any earlier parser with the same identity.
    pub fn register(&mut self, parser: Arc<dyn TrackerParser>) {
        let kind = parser.kind();
        self.parsers.retain(|p| p.kind() != kind);
        self.parsers.push(parser);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, parser: Arc<dyn TrackerParser>) -> Self {
        self.register(parser);
        self
    }

    pub fn get(&self, kind: TrackerKind) -> Option<Arc<dyn TrackerParser>> {
        self.parsers.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn kinds(&self) -> Vec<TrackerKind> {
        self.parsers.iter().map(|p| p.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Find the parser whose identity appears in the host or path of `url`.
    /// The query string and fragment are ignored.
    pub fn resolve(&self, url: &str) -> Option<Arc<dyn TrackerParser>> {
        let location = url.split(['?', '#']).next().unwrap_or_default();
        let lower = location.to_lowercase();
        self.parsers
            .iter()
            .find(|p| lower.contains(p.kind().as_str()))
            .cloned()
    }

    /// Group source URLs by the tracker that handles them.
    ///
    /// Groups come back in the order their tracker first appears. Any URL no
    /// registered tracker recognizes fails the whole call.
    pub fn group_urls(
        &self,
        urls: &[String],
    ) -> Result<Vec<(Arc<dyn TrackerParser>, Vec<String>)>, TrackerError> {
        let mut groups: Vec<(Arc<dyn TrackerParser>, Vec<String>)> = Vec::new();

        for url in urls {
            let parser = self
                .resolve(url)
                .ok_or_else(|| TrackerError::UnknownTracker(url.clone()))?;

            match groups.iter_mut().find(|(p, _)| p.kind() == parser.kind()) {
                Some((_, members)) => members.push(url.clone()),
                None => groups.push((parser, vec![url.clone()])),
            }
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTracker;

    fn registry() -> TrackerRegistry {
        TrackerRegistry::new()
            .with(Arc::new(MockTracker::new(TrackerKind::Rutor)))
            .with(Arc::new(MockTracker::new(TrackerKind::Kinozal)))
    }

    #[test]
    fn test_resolve_by_url_substring() {
        let registry = registry();

        let rutor = registry.resolve("http://jackett:9117/api/v2.0/indexers/rutor/results");
        assert_eq!(rutor.map(|p| p.kind()), Some(TrackerKind::Rutor));

        let kinozal = registry.resolve("https://KINOZAL.tv/browse.php?c=1002");
        assert_eq!(kinozal.map(|p| p.kind()), Some(TrackerKind::Kinozal));

        assert!(registry.resolve("https://example.org/").is_none());
    }

    #[test]
    fn test_resolve_ignores_query_string() {
        let registry = registry();

        let url = "http://jackett:9117/api/v2.0/indexers/kinozal/results?apikey=rutor1&Query=rutor";
        let resolved = registry.resolve(url);
        assert_eq!(resolved.map(|p| p.kind()), Some(TrackerKind::Kinozal));

        assert!(registry.resolve("https://example.org/search?q=rutor#kinozal").is_none());
    }

    #[test]
    fn test_register_replaces_same_identity() {
        let mut registry = registry();
        registry.register(Arc::new(MockTracker::new(TrackerKind::Rutor)));
        assert_eq!(registry.kinds(), vec![TrackerKind::Kinozal, TrackerKind::Rutor]);
    }

    #[test]
    fn test_group_urls_preserves_first_seen_order() {
        let urls = vec![
            "kinozal/page1".to_string(),
            "rutor/page1".to_string(),
            "kinozal/page2".to_string(),
        ];
        let groups = registry().group_urls(&urls).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.kind(), TrackerKind::Kinozal);
        assert_eq!(groups[0].1, vec!["kinozal/page1", "kinozal/page2"]);
        assert_eq!(groups[1].0.kind(), TrackerKind::Rutor);
    }

    #[test]
    fn test_group_urls_rejects_unknown() {
        let urls = vec!["rutor/page".to_string(), "https://example.org".to_string()];
        let err = registry().group_urls(&urls).err().unwrap();
        assert_eq!(err, TrackerError::UnknownTracker("https://example.org".to_string()));
    }
}

//! Deduplication of scraped torrents by info hash.

use std::cmp::Ordering;

use super::Torrent;

/// Remove torrents that share an info hash, compared case-insensitively.
///
/// The list is stably sorted by lower-cased info hash and a single forward
/// pass keeps the first torrent of every run of equal hashes, so which
/// duplicate survives depends only on input order. Torrents with an empty
/// info hash are never merged with each other.
///
/// Lists of zero or one element are returned untouched; otherwise the
/// result comes back in hash order. Works in place on the given vector.
pub fn remove_duplicates(mut torrents: Vec<Torrent>) -> Vec<Torrent> {
    if torrents.len() < 2 {
        return torrents;
    }

    torrents.sort_by(|a, b| compare_hashes(&a.info_hash, &b.info_hash));
    torrents.dedup_by(|current, kept| {
        !current.info_hash.is_empty() && current.info_hash.eq_ignore_ascii_case(&kept.info_hash)
    });

    torrents
}

fn compare_hashes(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

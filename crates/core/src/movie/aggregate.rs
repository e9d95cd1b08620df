//! Grouping of deduplicated torrents into movies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::MovieShort;
use crate::torrent::Torrent;

/// Group torrents into movies using the current time for undated listings.
pub fn aggregate_movies(torrents: Vec<Torrent>) -> Vec<MovieShort> {
    aggregate_movies_at(torrents, Utc::now())
}

/// Group torrents into movies, one per grouping key, in first-seen key order.
///
/// The key is the content hash, else the first non-empty of original title,
/// localized title and raw name. Torrents without any key are skipped. The
/// first torrent of a group seeds the search title and year; later ones only
/// fill the year while it is still empty.
pub fn aggregate_movies_at(torrents: Vec<Torrent>, now: DateTime<Utc>) -> Vec<MovieShort> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(MovieShort, Vec<Torrent>)> = Vec::new();

    for torrent in torrents {
        let Some(key) = grouping_key(&torrent) else {
            debug!(name = %torrent.name, "Skipping torrent without grouping key");
            continue;
        };

        match index.get(&key) {
            Some(&position) => {
                let (movie, members) = &mut groups[position];
                if movie.year.is_empty() && !torrent.year.trim().is_empty() {
                    movie.year = torrent.year.trim().to_string();
                }
                members.push(torrent);
            }
            None => {
                let movie = MovieShort::new(
                    key.clone(),
                    torrent.search_title(),
                    torrent.year.trim(),
                );
                index.insert(key, groups.len());
                groups.push((movie, vec![torrent]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(mut movie, members)| {
            movie.reconcile(&members, now);
            movie
        })
        .collect()
}

fn grouping_key(torrent: &Torrent) -> Option<String> {
    [
        &torrent.content_hash,
        &torrent.original_name,
        &torrent.localized_name,
        &torrent.name,
    ]
    .into_iter()
    .map(|s| s.trim())
    .find(|s| !s.is_empty())
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torrent::QualityFlags;
    use chrono::TimeZone;

    fn make_torrent(hash: &str, original: &str, year: &str) -> Torrent {
        Torrent {
            name: format!("{} ({})", original, year),
            original_name: original.to_string(),
            year: year.to_string(),
            content_hash: hash.to_string(),
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_first_non_empty_year_wins() {
        let torrents = vec![
            make_torrent("h1", "Movie", ""),
            make_torrent("h1", "Movie", "2021"),
            make_torrent("h1", "Movie", "2022"),
        ];
        let movies = aggregate_movies_at(torrents, fixed_now());

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].year, "2021");
    }

    #[test]
    fn test_quality_is_union_of_group() {
        let mut a = make_torrent("h1", "Movie", "2024");
        a.quality = QualityFlags {
            hdr: true,
            ..Default::default()
        };
        let mut b = make_torrent("h1", "Movie", "2024");
        b.quality = QualityFlags {
            uhd: true,
            ..Default::default()
        };

        let movies = aggregate_movies_at(vec![a, b], fixed_now());

        assert_eq!(movies.len(), 1);
        assert!(movies[0].quality.uhd);
        assert!(movies[0].quality.hdr);
        assert!(!movies[0].quality.dolby_vision);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let torrents = vec![
            make_torrent("b", "Second", "2020"),
            make_torrent("a", "First", "2021"),
            make_torrent("b", "Second", "2020"),
            make_torrent("c", "Third", "2022"),
        ];
        let keys: Vec<_> = aggregate_movies_at(torrents, fixed_now())
            .into_iter()
            .map(|m| m.key)
            .collect();

        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_key_falls_back_to_titles() {
        let localized_only = Torrent {
            name: "Холоп 2 (2024) WEB-DL".to_string(),
            localized_name: "Холоп 2".to_string(),
            year: "2024".to_string(),
            ..Default::default()
        };
        let raw_only = Torrent {
            name: "Some.Release.2023".to_string(),
            ..Default::default()
        };

        let movies = aggregate_movies_at(vec![localized_only, raw_only], fixed_now());

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].key, "Холоп 2");
        assert_eq!(movies[0].search_name, "Холоп 2");
        assert_eq!(movies[1].key, "Some.Release.2023");
        assert_eq!(movies[1].search_name, "Some.Release.2023");
    }

    #[test]
    fn test_torrent_without_key_is_skipped() {
        let empty = Torrent {
            name: "   ".to_string(),
            ..Default::default()
        };
        let movies = aggregate_movies_at(vec![empty, make_torrent("h", "Movie", "")], fixed_now());

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].key, "h");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_movies(vec![]).is_empty());
    }
}

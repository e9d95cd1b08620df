//! Normalization helpers shared by tracker parsers.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use sha2::{Digest, Sha256};

static MAGNET_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)urn:btih:([a-z0-9]+)").expect("magnet pattern is valid"));

/// Titles and year split out of a listing line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingTitle {
    pub localized: String,
    pub original: String,
    pub year: String,
}

/// Split a listing of the form `Localized / Original (Year) extras`.
///
/// Listings without a `/` only carry a localized title. When several `/`
/// separated names are present the last one is the original title.
pub fn parse_listing_title(text: &str) -> ListingTitle {
    let text = text.trim();

    let (localized, tail) = match text.split_once(" / ") {
        Some((localized, rest)) => (localized, rest.rsplit(" / ").next().unwrap_or(rest)),
        None => ("", text),
    };

    let (name, year) = match tail.split_once(" (") {
        Some((name, after)) => (name, after.split(')').next().unwrap_or("")),
        None => (tail, ""),
    };

    if localized.is_empty() {
        ListingTitle {
            localized: name.trim().to_string(),
            original: String::new(),
            year: year.trim().to_string(),
        }
    } else {
        ListingTitle {
            localized: localized.trim().to_string(),
            original: name.trim().to_string(),
            year: year.trim().to_string(),
        }
    }
}

/// Pull the info hash out of a magnet URI.
pub fn extract_info_hash(magnet: &str) -> Option<String> {
    MAGNET_HASH
        .captures(magnet)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Content identity for a release: sha256 over the normalized titles and year.
pub fn content_hash(localized: &str, original: &str, year: &str) -> String {
    let normalized = format!(
        "{}|{}|{}",
        localized.trim().to_lowercase(),
        original.trim().to_lowercase(),
        year.trim()
    );
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_with_original() {
        let title = parse_listing_title(
            "Плохие парни до конца / Bad Boys: Ride or Die (2024) WEB-DL 2160p | Dolby Vision",
        );
        assert_eq!(title.localized, "Плохие парни до конца");
        assert_eq!(title.original, "Bad Boys: Ride or Die");
        assert_eq!(title.year, "2024");
    }

    #[test]
    fn test_parse_title_localized_only() {
        let title = parse_listing_title("Холоп 2 (2024) WEB-DL 1080p");
        assert_eq!(title.localized, "Холоп 2");
        assert!(title.original.is_empty());
        assert_eq!(title.year, "2024");
    }

    #[test]
    fn test_parse_title_multiple_names_uses_last() {
        let title = parse_listing_title("Дюна / Dune: Part One / Dune (2021) BDRip");
        assert_eq!(title.localized, "Дюна");
        assert_eq!(title.original, "Dune");
        assert_eq!(title.year, "2021");
    }

    #[test]
    fn test_parse_title_year_range_and_missing_year() {
        let range = parse_listing_title("Сериал / Series (2020-2021) WEB-DL");
        assert_eq!(range.year, "2020-2021");

        let none = parse_listing_title("Something without a year");
        assert_eq!(none.localized, "Something without a year");
        assert!(none.year.is_empty());
    }

    #[test]
    fn test_extract_info_hash() {
        let magnet = "magnet:?xt=urn:btih:ABCDEF0123456789&dn=test";
        assert_eq!(
            extract_info_hash(magnet).as_deref(),
            Some("ABCDEF0123456789")
        );
        assert!(extract_info_hash("https://example.org/file.torrent").is_none());
    }

    #[test]
    fn test_content_hash_normalizes_case_and_whitespace() {
        let a = content_hash("Плохие парни", "Bad Boys", "2024");
        let b = content_hash(" плохие парни ", "BAD BOYS", "2024 ");
        let c = content_hash("Плохие парни", "Bad Boys", "2020");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}

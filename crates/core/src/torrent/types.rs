//! Types for scraped torrent listings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Video quality indicators detected on a listing.
///
/// Flags only ever accumulate: [`QualityFlags::merge`] sets what the other
/// side has set and never clears anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    /// 2160p / 4K.
    #[serde(default)]
    pub uhd: bool,
    /// 1080p.
    #[serde(default)]
    pub full_hd: bool,
    #[serde(default)]
    pub hdr: bool,
    #[serde(default)]
    pub hdr10: bool,
    #[serde(default)]
    pub hdr10_plus: bool,
    #[serde(default)]
    pub dolby_vision: bool,
}

impl QualityFlags {
    /// Detect quality flags from free listing text.
    ///
    /// HDR10+ implies HDR10 and HDR, HDR10 implies HDR. A bare HDR must be a
    /// whole token so rip labels such as "HDRip" do not count.
    pub fn from_title(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has_token = |wanted: &str| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == wanted)
        };
        let mut flags = Self {
            uhd: lower.contains("2160p") || has_token("4k"),
            full_hd: lower.contains("1080p"),
            dolby_vision: lower.contains("dolby vision") || has_token("dv"),
            ..Self::default()
        };

        if lower.contains("hdr10+") || lower.contains("hdr10plus") {
            flags.hdr10_plus = true;
            flags.hdr10 = true;
            flags.hdr = true;
        } else if lower.contains("hdr10") {
            flags.hdr10 = true;
            flags.hdr = true;
        } else if has_token("hdr") {
            flags.hdr = true;
        }

        flags
    }

    /// Set every flag that is set on `other`.
    pub fn merge(&mut self, other: &QualityFlags) {
        self.uhd |= other.uhd;
        self.full_hd |= other.full_hd;
        self.hdr |= other.hdr;
        self.hdr10 |= other.hdr10;
        self.hdr10_plus |= other.hdr10_plus;
        self.dolby_vision |= other.dolby_vision;
    }

    /// Whether any flag is set.
    pub fn any(&self) -> bool {
        self.uhd || self.full_hd || self.hdr || self.hdr10 || self.hdr10_plus || self.dolby_vision
    }
}

/// One listing scraped from a tracker page.
///
/// Torrents only live for the duration of a run: they are deduplicated,
/// folded into movies and then dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Listing title exactly as the tracker shows it.
    pub name: String,
    /// Link to the listing's details page.
    #[serde(default)]
    pub details_url: String,
    /// Title in the original language. Empty for localized-only listings.
    #[serde(default)]
    pub original_name: String,
    /// Localized title.
    #[serde(default)]
    pub localized_name: String,
    /// Release year. May be empty or a range such as "2020-2021".
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub seeders: u32,
    #[serde(default)]
    pub leechers: u32,
    /// Magnet URI.
    #[serde(default)]
    pub magnet: String,
    /// Info hash taken from the magnet URI, in whatever case the tracker
    /// used. Empty if unknown.
    #[serde(default)]
    pub info_hash: String,
    /// Publication date as reported by the tracker.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub quality: QualityFlags,
    /// Identity derived from the normalized titles and year, shared by the
    /// same release across trackers even when magnets differ.
    #[serde(default)]
    pub content_hash: String,
}

impl Torrent {
    /// Title to search metadata with: original, then localized, then raw name.
    pub fn search_title(&self) -> &str {
        [&self.original_name, &self.localized_name, &self.name]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Publication date in UTC, `None` when empty or unparseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_listing_date(&self.date)
    }
}

/// Parse the date formats trackers hand out.
///
/// Accepts RFC 3339 (including the `2006-01-02T15:04:05.000Z` layout),
/// naive `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_listing_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
}

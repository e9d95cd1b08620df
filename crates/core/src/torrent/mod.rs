//! Scraped torrent listings.
//!
//! A `Torrent` is what a tracker parser hands back for one listing. This
//! module also holds the normalization helpers parsers share and the
//! info-hash deduplication applied to the combined results of all trackers.

mod dedup;
mod listing;
mod types;

pub use dedup::remove_duplicates;
pub use listing::{content_hash, extract_info_hash, parse_listing_title, ListingTitle};
pub use types::{parse_listing_date, QualityFlags, Torrent};

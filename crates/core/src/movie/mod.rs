//! Movie records and the torrent-to-movie aggregation.

mod aggregate;
mod types;

pub use aggregate::{aggregate_movies, aggregate_movies_at};
pub use types::MovieShort;

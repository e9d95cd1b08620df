//! Match acceptance between a movie and a catalog candidate.

use tracing::debug;

use super::{ExternalCatalogError, MetadataSource, MovieMetadata};
use crate::movie::MovieShort;

/// Whether `candidate` is confidently the same movie.
///
/// The candidate's title or original title must equal the movie's search
/// title, ignoring case and surrounding whitespace. Years must agree unless
/// either side has none.
pub fn accepts(movie: &MovieShort, candidate: &MovieMetadata) -> bool {
    let wanted = movie.search_name.trim().to_lowercase();
    let same_title = [&candidate.title, &candidate.original_title]
        .into_iter()
        .any(|t| t.trim().to_lowercase() == wanted);

    let year = movie.year.trim();
    let same_year = match candidate.year() {
        None => true,
        Some(_) if year.is_empty() => true,
        Some(candidate_year) => candidate_year == year,
    };

    same_title && same_year
}

/// Look `movie` up and apply the candidate if it is accepted.
///
/// Rejected or missing candidates leave the metadata fields empty; callers
/// drop such movies afterwards.
pub async fn enrich_movie(
    source: &dyn MetadataSource,
    mut movie: MovieShort,
) -> Result<MovieShort, ExternalCatalogError> {
    let Some(candidate) = source.lookup(&movie.search_name, &movie.year).await? else {
        debug!(title = %movie.search_name, "No catalog candidate");
        return Ok(movie);
    };

    if accepts(&movie, &candidate) {
        movie.apply_metadata(candidate);
    } else {
        debug!(
            title = %movie.search_name,
            year = %movie.year,
            candidate = %candidate.title,
            candidate_year = candidate.year().unwrap_or(""),
            "Rejected catalog candidate"
        );
    }

    Ok(movie)
}

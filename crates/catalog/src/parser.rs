//! Normalisation of raw TMDb JSON into catalog types.
//!
//! Payload formats handled here:
//! - result pages: `{ page, total_pages, results: [ { id, title, ... } ] }`
//! - watch providers: `{ id, results: { "US": { flatrate: [..], rent: [..], buy: [..] } } }`
//! - genre list: `{ genres: [ { id, name } ] }`
//!
//! Individual malformed entries are skipped with a warning; a payload missing
//! its top-level structure is an error.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::types::*;

/// Movie fields copied into `Candidate::metadata` when the provider sends them
const METADATA_FIELDS: [&str; 8] = [
    "overview",
    "release_date",
    "popularity",
    "vote_average",
    "vote_count",
    "original_language",
    "poster_path",
    "genre_ids",
];

/// Lower-cased genre name -> provider genre id
pub type GenreMap = HashMap<String, GenreId>;

/// One page of movie results
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub movies: Vec<Candidate>,
}

impl MoviePage {
    /// Whether the provider reports pages after this one
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Parse a paged movie listing (search, similar, discover)
pub fn parse_movie_page(value: &Value) -> Result<MoviePage> {
    let results = value
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::missing("results"))?;

    let page = read_u32(value, "page").unwrap_or(1);
    let total_pages = read_u32(value, "total_pages").unwrap_or(page);

    let movies = results.iter().filter_map(parse_movie).collect();

    Ok(MoviePage {
        page,
        total_pages,
        movies,
    })
}

/// Convert one result entry into a candidate, or `None` if it lacks id/title
fn parse_movie(item: &Value) -> Option<Candidate> {
    let Some(id) = item.get("id").and_then(Value::as_u64) else {
        warn!("Skipping provider result without a numeric id: {}", item);
        return None;
    };

    let title = item
        .get("title")
        .or_else(|| item.get("original_title"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(title) = title else {
        warn!("Skipping provider result {} without a title", id);
        return None;
    };

    let mut candidate = Candidate::new(id, title);
    for field in METADATA_FIELDS {
        match item.get(field) {
            Some(Value::Null) | None => {}
            Some(v) => {
                candidate.metadata.insert(field.to_string(), v.clone());
            }
        }
    }
    Some(candidate)
}

/// Extract the offers for `region` from a watch-provider payload.
///
/// A region the provider has no entry for yields an empty list.
pub fn parse_watch_providers(value: &Value, region: &RegionCode) -> Result<Vec<AvailabilityOffer>> {
    let results = value
        .get("results")
        .and_then(Value::as_object)
        .ok_or_else(|| CatalogError::missing("results"))?;

    let Some(country) = results.get(region.as_str()) else {
        return Ok(Vec::new());
    };

    let mut offers = Vec::new();
    for kind in OfferKind::ALL {
        let Some(entries) = country.get(kind.provider_key()).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let provider_id = entry.get("provider_id").and_then(Value::as_u64);
            let provider_name = entry.get("provider_name").and_then(Value::as_str);
            match (provider_id, provider_name) {
                (Some(provider_id), Some(provider_name)) => offers.push(AvailabilityOffer {
                    kind,
                    provider_id,
                    provider_name: provider_name.to_string(),
                    region: region.clone(),
                    display_priority: read_u32(entry, "display_priority"),
                }),
                _ => warn!(
                    "Skipping malformed {} offer in region {}: {}",
                    kind.provider_key(),
                    region,
                    entry
                ),
            }
        }
    }
    Ok(offers)
}

/// Build the genre lookup table from `/genre/movie/list`
pub fn parse_genre_list(value: &Value) -> Result<GenreMap> {
    let genres = value
        .get("genres")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::missing("genres"))?;

    let mut map = GenreMap::with_capacity(genres.len());
    for genre in genres {
        let id = genre.get("id").and_then(Value::as_u64);
        let name = genre.get("name").and_then(Value::as_str);
        match (id, name) {
            (Some(id), Some(name)) => {
                let id = GenreId::try_from(id).map_err(|_| CatalogError::InvalidValue {
                    field: "genres.id".to_string(),
                    value: id.to_string(),
                })?;
                map.insert(name.trim().to_lowercase(), id);
            }
            _ => warn!("Skipping malformed genre entry: {}", genre),
        }
    }
    Ok(map)
}

fn read_u32(value: &Value, field: &str) -> Option<u32> {
    value
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

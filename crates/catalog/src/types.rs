//! Core domain types shared by the agents, the provider adapter and the server.
//!
//! Everything here is plain data: agents create and pass these values along,
//! nothing holds on to them after a request finishes.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Provider-assigned movie identifier (TMDb ids are positive integers)
pub type MovieId = u64;

/// Provider-assigned genre identifier
pub type GenreId = u32;

/// Opaque per-movie metadata copied from the provider
pub type Metadata = BTreeMap<String, Value>;

// =============================================================================
// Region
// =============================================================================

/// ISO 3166-1 alpha-2 region code, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RegionCode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(RegionCode(trimmed.to_ascii_uppercase()))
        } else {
            Err(CatalogError::InvalidRegion(s.to_string()))
        }
    }
}

impl TryFrom<String> for RegionCode {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionCode> for String {
    fn from(region: RegionCode) -> Self {
        region.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Intent
// =============================================================================

/// The single axis a recommendation is resolved along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    /// Free-text title search
    Query(String),
    /// "More like this" for a named movie
    SeedTitle(String),
    /// Browse a genre by name (or numeric id)
    Genre(String),
}

impl Lookup {
    /// Short label used in logs and message tags
    pub fn label(&self) -> &'static str {
        match self {
            Lookup::Query(_) => "query",
            Lookup::SeedTitle(_) => "seed_title",
            Lookup::Genre(_) => "genre",
        }
    }
}

/// Normalised representation of what the user asked for.
///
/// Exactly one of query / seed title / genre is set; `Lookup` makes that a
/// property of the type rather than something callers must check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub lookup: Lookup,
    pub count: NonZeroUsize,
    pub region: RegionCode,
}

impl Intent {
    pub fn new(lookup: Lookup, count: NonZeroUsize, region: RegionCode) -> Self {
        Self {
            lookup,
            count,
            region,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match &self.lookup {
            Lookup::Query(text) => Some(text),
            _ => None,
        }
    }

    pub fn seed_title(&self) -> Option<&str> {
        match &self.lookup {
            Lookup::SeedTitle(title) => Some(title),
            _ => None,
        }
    }

    pub fn genre(&self) -> Option<&str> {
        match &self.lookup {
            Lookup::Genre(genre) => Some(genre),
            _ => None,
        }
    }
}

// =============================================================================
// Candidates and Offers
// =============================================================================

/// How a title can be watched through a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Stream,
    Rent,
    Buy,
}

impl OfferKind {
    /// Key used for this kind in TMDb watch-provider payloads
    pub fn provider_key(self) -> &'static str {
        match self {
            OfferKind::Stream => "flatrate",
            OfferKind::Rent => "rent",
            OfferKind::Buy => "buy",
        }
    }

    pub const ALL: [OfferKind; 3] = [OfferKind::Stream, OfferKind::Rent, OfferKind::Buy];
}

/// A region-specific way to watch a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOffer {
    pub kind: OfferKind,
    pub provider_id: u64,
    pub provider_name: String,
    pub region: RegionCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_priority: Option<u32>,
}

/// A movie produced by the recommendation step.
///
/// Only `offers` changes after creation, when availability is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub offers: Vec<AvailabilityOffer>,
}

impl Candidate {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            metadata: Metadata::new(),
            offers: Vec::new(),
        }
    }

    /// Attach availability, replacing whatever was there before
    pub fn with_offers(mut self, offers: Vec<AvailabilityOffer>) -> Self {
        self.offers = offers;
        self
    }
}

// =============================================================================
// Inbound / Outbound
// =============================================================================

/// Raw recommendation request as received from a client.
///
/// Nothing is validated here; `UserIntentAgent` turns this into an `Intent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub seed_movie: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub num: Option<i64>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    NoResults,
}

/// Final answer for a recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub status: ResponseStatus,
    pub movies: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecommendResponse {
    pub fn ok(movies: Vec<Candidate>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            movies,
            reason: None,
        }
    }

    pub fn no_results(reason: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::NoResults,
            movies: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

/// Offers for a single movie in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereToWatch {
    pub movie_id: MovieId,
    pub region: RegionCode,
    pub offers: Vec<AvailabilityOffer>,
}

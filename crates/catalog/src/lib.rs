//! # Catalog Crate
//!
//! Domain types for the movie-agents workspace and the normalisation of raw
//! provider payloads into them.
//!
//! ## Main Components
//!
//! - **types**: Intent, Candidate, AvailabilityOffer, RegionCode and the
//!   request/response shapes exchanged with clients
//! - **parser**: TMDb JSON -> catalog types
//! - **error**: Error types for normalisation and validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{parse_movie_page, RegionCode};
//!
//! let page = parse_movie_page(&search_json)?;
//! let region: RegionCode = "us".parse()?;
//! println!("{} movies, region {}", page.movies.len(), region);
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use parser::{GenreMap, MoviePage, parse_genre_list, parse_movie_page, parse_watch_providers};
pub use types::{
    // Type aliases
    GenreId,
    Metadata,
    MovieId,
    // Core types
    AvailabilityOffer,
    Candidate,
    Intent,
    Lookup,
    OfferKind,
    RecommendRequest,
    RecommendResponse,
    RegionCode,
    ResponseStatus,
    WhereToWatch,
};

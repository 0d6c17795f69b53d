//! Error types for the catalog crate.
//!
//! These cover provider payloads that do not have the shape the catalog
//! expects, plus user-supplied values (region codes) that fail validation.

use thiserror::Error;

/// Errors raised while normalising provider data into catalog types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A field the payload must carry is absent or has the wrong JSON type
    #[error("Missing field in provider payload: {field}")]
    MissingField { field: String },

    /// A field was present but its value could not be used
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Region codes are two ASCII letters (ISO 3166-1 alpha-2)
    #[error("Invalid region code: '{0}'")]
    InvalidRegion(String),
}

impl CatalogError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        CatalogError::MissingField {
            field: field.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;

// crates/geoindex-core/src/error.rs

use thiserror::Error;

/// Crate-wide error type.
///
/// The first four variants carry the taxonomy every caller has to reason
/// about (bad input, missing record, failed write, bad configuration); the
/// remaining ones wrap lower-level failures from I/O, codecs and the
/// relational backend.
#[derive(Debug, Error)]
pub enum GeoError {
    /// An entity could not be constructed from the given values
    /// (coordinates out of range, duplicate admin level, empty country, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record, admin level or index key that was asked for does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A multi-step write failed and was rolled back.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// The configuration cannot be used as given.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary codec error: {0}")]
    Bincode(#[from] bincode::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "relational")]
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),
}

impl GeoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GeoError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        GeoError::NotFound(msg.into())
    }

    /// True for [`GeoError::NotFound`]; handy in callers that treat a missing
    /// record as an empty answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;

// crates/geoindex-core/src/query.rs
//! Query objects accepted by [`crate::Location`].

use crate::model::Coordinates;

/// Results returned by a forward query that does not ask for a limit.
pub const DEFAULT_GEOCODE_LIMIT: usize = 30;

/// Forward (text) query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeocodeQuery {
    text: String,
    limit: usize,
    locale: Option<String>,
}

impl GeocodeQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_GEOCODE_LIMIT,
            locale: None,
        }
    }

    /// `0` restores the default limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { DEFAULT_GEOCODE_LIMIT } else { limit };
        self
    }

    /// An empty locale means the configured default locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        self.locale = (!locale.trim().is_empty()).then_some(locale);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

/// Reverse (coordinate) query.
#[derive(Clone, Debug, PartialEq)]
pub struct ReverseQuery {
    coordinates: Coordinates,
    locale: Option<String>,
}

impl ReverseQuery {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        self.locale = (!locale.trim().is_empty()).then_some(locale);
        self
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

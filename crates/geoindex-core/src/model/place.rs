// crates/geoindex-core/src/model/place.rs
use super::address::Address;
use super::geometry::{Bounds, Polygon};
use crate::error::{GeoError, Result};
use crate::raw::PlaceRaw;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Locale used when a place is built from a single address without one.
pub const DEFAULT_LOCALE: &str = "en";

/// Opaque identifier of a persisted place (the "hash").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The aggregate stored in and returned by the index.
///
/// A place owns one [`Address`] per locale plus its polygons. One of the
/// locales is the *primary* one; it is used whenever a caller does not ask
/// for a specific locale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaceRaw", into = "PlaceRaw")]
pub struct Place {
    pub(crate) id: Option<PlaceId>,
    pub(crate) addresses: BTreeMap<String, Address>,
    pub(crate) primary_locale: String,
    pub(crate) polygons: Vec<Polygon>,
    pub(crate) bounds: Option<Bounds>,
    pub(crate) postal_code: Option<String>,
    pub(crate) timezone: Option<String>,
    pub(crate) provided_by: String,
}

impl Place {
    /// Place with a single address; its locale becomes the primary locale.
    pub fn new(address: Address) -> Self {
        let locale = address.locale().to_string();
        let mut addresses = BTreeMap::new();
        addresses.insert(locale.clone(), address);
        Self {
            id: None,
            addresses,
            primary_locale: locale,
            polygons: Vec::new(),
            bounds: None,
            postal_code: None,
            timezone: None,
            provided_by: String::new(),
        }
    }

    /// Place with one address per locale.
    ///
    /// Fails when no address is given, when two addresses share a locale or
    /// when `primary_locale` is not among them.
    pub fn from_addresses(
        addresses: impl IntoIterator<Item = Address>,
        primary_locale: &str,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        for address in addresses {
            let locale = address.locale().to_string();
            if map.insert(locale.clone(), address).is_some() {
                return Err(GeoError::validation(format!(
                    "place has two addresses for locale '{locale}'"
                )));
            }
        }
        if map.is_empty() {
            return Err(GeoError::validation("place needs at least one address"));
        }
        if !map.contains_key(primary_locale) {
            return Err(GeoError::validation(format!(
                "primary locale '{primary_locale}' has no address"
            )));
        }
        Ok(Self {
            id: None,
            addresses: map,
            primary_locale: primary_locale.to_string(),
            polygons: Vec::new(),
            bounds: None,
            postal_code: None,
            timezone: None,
            provided_by: String::new(),
        })
    }

    /// Same place with another primary locale.
    pub fn with_primary_locale(mut self, locale: &str) -> Result<Self> {
        if !self.addresses.contains_key(locale) {
            return Err(GeoError::validation(format!(
                "locale '{locale}' has no address"
            )));
        }
        self.primary_locale = locale.to_string();
        Ok(self)
    }

    pub fn with_polygons(mut self, polygons: Vec<Polygon>) -> Self {
        self.polygons = polygons;
        self
    }

    pub fn with_polygon(mut self, polygon: Polygon) -> Self {
        self.polygons.push(polygon);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_provided_by(mut self, provided_by: impl Into<String>) -> Self {
        self.provided_by = provided_by.into();
        self
    }

    /// Attaches an identifier. Meant for storage providers rehydrating a
    /// persisted record; the index assigns identifiers itself on `add`.
    pub fn with_id(mut self, id: PlaceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<&PlaceId> {
        self.id.as_ref()
    }

    pub fn primary_locale(&self) -> &str {
        &self.primary_locale
    }

    pub fn primary_address(&self) -> &Address {
        // `primary_locale` is checked against the map by every constructor.
        &self.addresses[&self.primary_locale]
    }

    pub fn address(&self, locale: &str) -> Option<&Address> {
        self.addresses.get(locale)
    }

    /// Address for `locale`, or the primary one when that locale is missing.
    pub fn address_or_primary(&self, locale: &str) -> &Address {
        self.address(locale)
            .unwrap_or_else(|| self.primary_address())
    }

    pub fn addresses(&self) -> &BTreeMap<String, Address> {
        &self.addresses
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> + '_ {
        self.addresses.keys().map(String::as_str)
    }

    /// Replaces (or adds) the address for its own locale.
    pub fn set_address(&mut self, address: Address) {
        self.addresses.insert(address.locale().to_string(), address);
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn set_postal_code(&mut self, postal_code: impl Into<String>) {
        self.postal_code = Some(postal_code.into());
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn set_timezone(&mut self, timezone: impl Into<String>) {
        self.timezone = Some(timezone.into());
    }

    pub fn provided_by(&self) -> &str {
        &self.provided_by
    }

    pub fn set_provided_by(&mut self, provided_by: impl Into<String>) {
        self.provided_by = provided_by.into();
    }

    /// Most specific admin level of the address in `locale` (falls back to
    /// the primary address).
    pub fn max_admin_level(&self, locale: &str) -> i32 {
        self.address_or_primary(locale).max_admin_level()
    }

    /// True when both places carry the same identifier.
    pub fn is_same(&self, other: &Place) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdminLevelCollection;

    fn address(locale: &str, levels: &[(i32, &str)]) -> Address {
        Address::new(
            locale,
            AdminLevelCollection::from_pairs(levels.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn primary_locale_must_have_an_address() {
        let err = Place::from_addresses([address("en", &[(0, "Ukraine")])], "de").unwrap_err();
        assert!(matches!(err, GeoError::Validation(_)));
        assert!(Place::from_addresses(Vec::new(), "en").is_err());
    }

    #[test]
    fn rejects_two_addresses_for_one_locale() {
        let result = Place::from_addresses(
            [address("en", &[(0, "Ukraine")]), address("en", &[(0, "UA")])],
            "en",
        );
        assert!(result.is_err());
    }

    #[test]
    fn max_admin_level_is_per_locale() {
        let place = Place::from_addresses(
            [
                address("en", &[(0, "Ukraine"), (2, "Kyiv")]),
                address("uk", &[(0, "Україна")]),
            ],
            "en",
        )
        .unwrap();
        assert_eq!(place.max_admin_level("en"), 2);
        assert_eq!(place.max_admin_level("uk"), 0);
        // unknown locale falls back to the primary address
        assert_eq!(place.max_admin_level("fr"), 2);
    }

    #[test]
    fn identity_requires_both_ids() {
        let a = Place::new(address("en", &[(0, "Ukraine")]));
        let b = a.clone();
        assert!(!a.is_same(&b));
        let id = PlaceId::generate();
        let a = a.with_id(id.clone());
        let b = b.with_id(id);
        assert!(a.is_same(&b));
    }
}

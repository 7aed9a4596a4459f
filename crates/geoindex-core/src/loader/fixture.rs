// crates/geoindex-core/src/loader/fixture.rs

//! GeoJSON-like place documents.
//!
//! ```json
//! {
//!   "geocoding": {"attribution": "..."},
//!   "features": [{
//!     "geometry": {"coordinates": [[[lat, lon, alt?], ...], ...]},
//!     "properties": {
//!       "common": {"postcode": "...", "bbox": [west, east, north, south]},
//!       "en": {"geocoding": {"admin": {"level0": "..."}, "street": "...", ...}}
//!     }
//!   }]
//! }
//! ```
//!
//! Vertex arrays are latitude first. Only the first feature is read.

use crate::error::{GeoError, Result};
use crate::model::{
    Address, AdminLevel, AdminLevelCollection, Bounds, Coordinates, Country, Place, Polygon,
    DEFAULT_LOCALE,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    geocoding: Attribution,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
struct Attribution {
    #[serde(default)]
    attribution: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    common: Common,
    #[serde(flatten)]
    locales: BTreeMap<String, LocaleProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct Common {
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocaleProperties {
    geocoding: LocaleGeocoding,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocaleGeocoding {
    admin: BTreeMap<String, String>,
    housenumber: Option<String>,
    street: Option<String>,
    state: Option<String>,
    city: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

impl LocaleGeocoding {
    fn into_address(self, locale: &str) -> Result<Address> {
        let levels = self
            .admin
            .iter()
            .map(|(key, name)| admin_level(key, name))
            .collect::<Result<Vec<_>>>()?;
        let mut address = Address::new(locale, AdminLevelCollection::new(levels)?);

        if let Some(number) = self.housenumber {
            address = address.with_street_number(number);
        }
        if let Some(street) = self.street {
            address = address.with_street_name(street);
        }
        if let Some(state) = self.state {
            address = address.with_locality(state);
        }
        if let Some(city) = self.city {
            address = address.with_sub_locality(city);
        }
        if self.country.is_some() || self.country_code.is_some() {
            address = address.with_country(Country::new(self.country, self.country_code)?);
        }
        Ok(address)
    }
}

// "level4" -> 4
fn admin_level(key: &str, name: &str) -> Result<AdminLevel> {
    let level = key
        .strip_prefix("level")
        .and_then(|n| n.parse::<i32>().ok())
        .ok_or_else(|| GeoError::validation(format!("admin key '{key}' is not level<N>")))?;
    Ok(AdminLevel::new(level, name))
}

fn polygon(ring: &[Vec<f64>]) -> Result<Polygon> {
    ring.iter()
        .filter(|vertex| vertex.len() >= 2)
        .map(|vertex| {
            let altitude = vertex.get(2).copied().unwrap_or(0.0);
            Coordinates::with_altitude(vertex[1], vertex[0], altitude)
        })
        .collect()
}

/// Parses one place document from `reader`.
pub fn parse_place(reader: impl Read) -> Result<Place> {
    let document: Document = serde_json::from_reader(reader)?;
    let feature = document
        .features
        .into_iter()
        .next()
        .ok_or_else(|| GeoError::validation("document has no features"))?;

    let addresses = feature
        .properties
        .locales
        .into_iter()
        .map(|(locale, props)| props.geocoding.into_address(&locale))
        .collect::<Result<Vec<_>>>()?;
    let primary = if addresses.iter().any(|a| a.locale() == DEFAULT_LOCALE) {
        DEFAULT_LOCALE.to_string()
    } else {
        addresses
            .first()
            .map(|a| a.locale().to_string())
            .ok_or_else(|| GeoError::validation("document has no localized properties"))?
    };

    let polygons = feature
        .geometry
        .coordinates
        .iter()
        .map(|ring| polygon(ring))
        .collect::<Result<Vec<_>>>()?;
    let mut place = Place::from_addresses(addresses, &primary)?.with_polygons(polygons);

    let common = feature.properties.common;
    if let Some([west, east, north, south]) = common.bbox {
        place = place.with_bounds(Bounds::new(west, east, north, south)?);
    }
    if let Some(postcode) = common.postcode.filter(|p| !p.is_empty()) {
        place = place.with_postal_code(postcode);
    }
    if let Some(timezone) = common.timezone.filter(|t| !t.is_empty()) {
        place = place.with_timezone(timezone);
    }
    if let Some(attribution) = document.geocoding.attribution {
        place = place.with_provided_by(attribution);
    }
    Ok(place)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Place> {
        parse_place(json.as_bytes())
    }

    #[test]
    fn maps_fields_per_locale() {
        let place = parse(
            r#"{
            "geocoding": {"attribution": "OpenStreetMap"},
            "features": [{
                "geometry": {"coordinates": [[[51.23, 6.74, 35.0], [51.23, 6.75], [51.24, 6.75], [51.24]]]},
                "properties": {
                    "common": {"postcode": "40545", "bbox": [6.74, 6.75, 51.24, 51.23]},
                    "de": {"geocoding": {"admin": {"level0": "Deutschland", "level2": "Düsseldorf"},
                           "city": "Düsseldorf", "state": "Nordrhein-Westfalen",
                           "street": "Belsenplatz", "housenumber": "1", "country": "Deutschland"}},
                    "en": {"geocoding": {"admin": {"level0": "Germany", "level2": "Dusseldorf"},
                           "city": "Dusseldorf", "state": "North Rhine-Westphalia",
                           "street": "Belsenplatz", "housenumber": "1",
                           "country": "Germany", "country_code": "DE"}}
                }
            }]
        }"#,
        )
        .unwrap();

        assert_eq!(place.primary_locale(), "en");
        assert_eq!(place.provided_by(), "OpenStreetMap");
        assert_eq!(place.postal_code(), Some("40545"));
        assert_eq!(place.bounds().map(|b| b.west()), Some(6.74));

        let en = place.primary_address();
        assert_eq!(en.street_number(), "1");
        assert_eq!(en.street_name(), "Belsenplatz");
        assert_eq!(en.locality(), "North Rhine-Westphalia");
        assert_eq!(en.sub_locality(), "Dusseldorf");
        assert_eq!(en.country().and_then(|c| c.code()), Some("DE"));
        assert_eq!(en.max_admin_level(), 2);

        let de = place.address("de").unwrap();
        assert_eq!(de.sub_locality(), "Düsseldorf");
        assert_eq!(de.country().and_then(|c| c.code()), None);

        // the short vertex is dropped, lat comes first
        let ring = place.polygons()[0].coordinates();
        assert_eq!(ring.len(), 3);
        assert_eq!(ring[0].longitude(), 6.74);
        assert_eq!(ring[0].latitude(), 51.23);
        assert_eq!(ring[0].altitude(), 35.0);
        assert_eq!(ring[1].altitude(), 0.0);
    }

    #[test]
    fn primary_falls_back_to_first_locale() {
        let place = parse(
            r#"{"features": [{"properties": {
                "uk": {"geocoding": {"admin": {"level0": "Україна"}}},
                "de": {"geocoding": {"admin": {"level0": "Ukraine"}}}
            }}]}"#,
        )
        .unwrap();
        assert_eq!(place.primary_locale(), "de");
        assert!(place.polygons().is_empty());
        assert_eq!(place.postal_code(), None);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(parse(r#"{"features": []}"#), Err(GeoError::Validation(_))));
        assert!(matches!(
            parse(r#"{"features": [{"properties": {"common": {}}}]}"#),
            Err(GeoError::Validation(_))
        ));
        assert!(matches!(
            parse(r#"{"features": [{"properties": {"en": {"geocoding": {"admin": {"levelX": "?"}}}}}]}"#),
            Err(GeoError::Validation(_))
        ));
        // latitude out of range
        assert!(matches!(
            parse(r#"{"features": [{"geometry": {"coordinates": [[[95.0, 10.0]]]},
                "properties": {"en": {"geocoding": {}}}}]}"#),
            Err(GeoError::Validation(_))
        ));
        assert!(matches!(parse("not json"), Err(GeoError::Json(_))));
    }
}

// crates/geoindex-core/src/model/convert.rs
//! Conversions between the validated model and its raw serde mirrors.

use super::{Bounds, Coordinates, Country, Place, PlaceId, DEFAULT_LOCALE};
use crate::error::{GeoError, Result};
use crate::raw::{BoundsRaw, CoordinatesRaw, CountryRaw, PlaceRaw};

impl TryFrom<CoordinatesRaw> for Coordinates {
    type Error = GeoError;

    fn try_from(raw: CoordinatesRaw) -> Result<Self> {
        Coordinates::with_altitude(raw.lon, raw.lat, raw.alt)
    }
}

impl From<Coordinates> for CoordinatesRaw {
    fn from(c: Coordinates) -> Self {
        CoordinatesRaw {
            lon: c.longitude(),
            lat: c.latitude(),
            alt: c.altitude(),
        }
    }
}

impl TryFrom<BoundsRaw> for Bounds {
    type Error = GeoError;

    fn try_from(raw: BoundsRaw) -> Result<Self> {
        Bounds::new(raw.west, raw.east, raw.north, raw.south)
    }
}

impl From<Bounds> for BoundsRaw {
    fn from(b: Bounds) -> Self {
        BoundsRaw {
            west: b.west(),
            east: b.east(),
            north: b.north(),
            south: b.south(),
        }
    }
}

impl TryFrom<CountryRaw> for Country {
    type Error = GeoError;

    fn try_from(raw: CountryRaw) -> Result<Self> {
        Country::new(raw.name, raw.code)
    }
}

impl From<Country> for CountryRaw {
    fn from(c: Country) -> Self {
        CountryRaw {
            name: c.name().map(str::to_string),
            code: c.code().map(str::to_string),
        }
    }
}

impl TryFrom<PlaceRaw> for Place {
    type Error = GeoError;

    fn try_from(raw: PlaceRaw) -> Result<Self> {
        for (locale, address) in &raw.address {
            if locale != address.locale() {
                return Err(GeoError::validation(format!(
                    "address stored under locale '{locale}' declares locale '{}'",
                    address.locale()
                )));
            }
        }

        // Without an explicit primary locale prefer the default one, then the first.
        let primary = match raw.primary_locale {
            Some(locale) => locale,
            None if raw.address.contains_key(DEFAULT_LOCALE) => DEFAULT_LOCALE.to_string(),
            None => raw
                .address
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| GeoError::validation("place record has no address"))?,
        };

        let mut place = Place::from_addresses(raw.address.into_values(), &primary)?;
        place.polygons = raw.polygons;
        place.bounds = raw.bounds;
        place.postal_code = raw.postal_code;
        place.timezone = raw.timezone;
        place.provided_by = raw.provided_by;
        place.id = raw.hash.map(PlaceId::new);
        Ok(place)
    }
}

impl From<Place> for PlaceRaw {
    fn from(place: Place) -> Self {
        PlaceRaw {
            hash: place.id.map(|id| id.as_str().to_string()),
            address: place.addresses,
            primary_locale: Some(place.primary_locale),
            polygons: place.polygons,
            bounds: place.bounds,
            postal_code: place.postal_code,
            timezone: place.timezone,
            provided_by: place.provided_by,
        }
    }
}

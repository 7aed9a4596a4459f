// crates/geoindex-core/src/model/geometry.rs
use crate::error::{GeoError, Result};
use crate::raw::{BoundsRaw, CoordinatesRaw};
use serde::{Deserialize, Serialize};

#[inline]
fn check_longitude(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(GeoError::validation(format!(
            "{what} {value} is outside of [-180, 180]"
        )))
    }
}

#[inline]
fn check_latitude(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(GeoError::validation(format!(
            "{what} {value} is outside of [-90, 90]"
        )))
    }
}

/// A geographic point. Longitude and latitude are in degrees, altitude in meters.
///
/// Both angles are validated on construction, so a `Coordinates` value is
/// always inside the valid range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesRaw", into = "CoordinatesRaw")]
pub struct Coordinates {
    longitude: f64,
    latitude: f64,
    altitude: f64,
}

impl Coordinates {
    /// Point on the reference surface (altitude 0).
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        Self::with_altitude(longitude, latitude, 0.0)
    }

    pub fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Result<Self> {
        check_longitude(longitude, "longitude")?;
        check_latitude(latitude, "latitude")?;
        if !altitude.is_finite() {
            return Err(GeoError::validation(format!(
                "altitude {altitude} is not a finite number"
            )));
        }
        Ok(Self {
            longitude,
            latitude,
            altitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

/// Axis-aligned bounding box of a place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundsRaw", into = "BoundsRaw")]
pub struct Bounds {
    west: f64,
    east: f64,
    north: f64,
    south: f64,
}

impl Bounds {
    pub fn new(west: f64, east: f64, north: f64, south: f64) -> Result<Self> {
        check_longitude(west, "west")?;
        check_longitude(east, "east")?;
        check_latitude(north, "north")?;
        check_latitude(south, "south")?;
        Ok(Self {
            west,
            east,
            north,
            south,
        })
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }
}

/// A closed ring of vertices. Ring order is significant; the closing vertex
/// may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    coordinates: Vec<Coordinates>,
}

impl Polygon {
    pub fn new(coordinates: Vec<Coordinates>) -> Self {
        Self { coordinates }
    }

    pub fn push(&mut self, coordinates: Coordinates) {
        self.coordinates.push(coordinates);
    }

    pub fn coordinates(&self) -> &[Coordinates] {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

impl FromIterator<Coordinates> for Polygon {
    fn from_iter<I: IntoIterator<Item = Coordinates>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_boundary_values() {
        assert!(Coordinates::new(180.0, 90.0).is_ok());
        assert!(Coordinates::new(-180.0, -90.0).is_ok());
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(matches!(
            Coordinates::new(181.0, 0.0),
            Err(GeoError::Validation(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -91.0),
            Err(GeoError::Validation(_))
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::with_altitude(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn bounds_validate_each_axis() {
        assert!(Bounds::new(6.6, 6.9, 51.3, 51.1).is_ok());
        assert!(Bounds::new(-181.0, 6.9, 51.3, 51.1).is_err());
        assert!(Bounds::new(6.6, 6.9, 91.0, 51.1).is_err());
    }

    #[test]
    fn polygon_collects_vertices_in_order() {
        let mut polygon: Polygon = [(0.0, 0.0), (1.0, 0.0)]
            .iter()
            .map(|&(lon, lat)| Coordinates::new(lon, lat).unwrap())
            .collect();
        polygon.push(Coordinates::new(1.0, 1.0).unwrap());
        assert_eq!(polygon.len(), 3);
        assert_eq!(polygon.coordinates()[2].latitude(), 1.0);
    }
}

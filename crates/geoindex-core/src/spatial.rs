// crates/geoindex-core/src/spatial.rs
//! Distance and containment.

use crate::model::{Coordinates, PairedCoordinates, Place, Polygon};
use std::sync::Arc;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6372.795477598;

/// Great-circle distance in kilometers, with the altitude difference folded
/// in as a straight vertical leg.
///
/// ```
/// use geoindex_core::{spatial::distance, Coordinates};
///
/// let a = Coordinates::with_altitude(30.520620, 50.455414, 172.6).unwrap();
/// let b = Coordinates::with_altitude(30.557294, 50.434596, 190.8).unwrap();
/// assert!((distance(&a, &b) - 3.4799019034641283).abs() < 1e-9);
/// ```
pub fn distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();
    let d_alt = (b.altitude() - a.altitude()).abs() * 0.001;

    let arg = (d_lat / 2.0).sin().powi(2)
        + a.latitude().to_radians().cos()
            * b.latitude().to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    // sqrt(arg) can overshoot 1.0 for near-antipodal points
    let flat = 2.0 * EARTH_RADIUS_KM * arg.sqrt().min(1.0).asin();

    (flat * flat + d_alt * d_alt).sqrt()
}

/// Even-odd containment test with longitude as x and latitude as y.
///
/// Rings with fewer than three vertices contain nothing. Points exactly on
/// an edge may fall on either side.
pub fn polygon_contains(polygon: &Polygon, point: &Coordinates) -> bool {
    let ring = polygon.coordinates();
    if ring.len() < 3 {
        return false;
    }
    let (x, y) = (point.longitude(), point.latitude());

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].longitude(), ring[i].latitude());
        let (xj, yj) = (ring[j].longitude(), ring[j].latitude());
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// True when any polygon of `place` contains `point`.
pub fn place_contains(place: &Place, point: &Coordinates) -> bool {
    place.polygons().iter().any(|p| polygon_contains(p, point))
}

/// For every vertex of `candidate`, the nearest vertex of `original` if it is
/// at most `max_distance_km` away.
///
/// Cost is the product of the two vertex counts.
pub fn touching_pairs(
    original: &Arc<Place>,
    candidate: &Arc<Place>,
    max_distance_km: f64,
) -> Vec<PairedCoordinates> {
    let origin_vertices: Vec<&Coordinates> = original
        .polygons()
        .iter()
        .flat_map(|p| p.coordinates())
        .collect();
    if origin_vertices.is_empty() {
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for c in candidate.polygons().iter().flat_map(|p| p.coordinates()) {
        let nearest = origin_vertices
            .iter()
            .map(|o| (distance(c, o), *o))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((d, o)) = nearest {
            if d <= max_distance_km {
                pairs.push(PairedCoordinates::new(
                    *o,
                    Arc::clone(original),
                    *c,
                    Arc::clone(candidate),
                    d,
                ));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, AdminLevelCollection};

    fn at(lon: f64, lat: f64) -> Coordinates {
        Coordinates::new(lon, lat).unwrap()
    }

    fn rect(west: f64, south: f64, east: f64, north: f64) -> Polygon {
        Polygon::new(vec![at(west, south), at(east, south), at(east, north), at(west, north)])
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Coordinates::with_altitude(30.52062, 50.455414, 172.6).unwrap();
        let b = Coordinates::with_altitude(30.557294, 50.434596, 190.8).unwrap();
        assert_eq!(distance(&a, &a), 0.0);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert!((distance(&a, &b) - 3.4799019034641283).abs() < 1e-9);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = distance(&at(0.0, 0.0), &at(180.0, 0.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn altitude_only_difference() {
        let a = Coordinates::with_altitude(10.0, 10.0, 0.0).unwrap();
        let b = Coordinates::with_altitude(10.0, 10.0, 1500.0).unwrap();
        assert!((distance(&a, &b) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn containment_uses_even_odd_rule() {
        let square = rect(0.0, 0.0, 10.0, 10.0);
        assert!(polygon_contains(&square, &at(5.0, 5.0)));
        assert!(!polygon_contains(&square, &at(15.0, 5.0)));
        assert!(!polygon_contains(&square, &at(5.0, -1.0)));

        // explicit closing vertex changes nothing
        let mut closed = square.clone();
        closed.push(at(0.0, 0.0));
        assert!(polygon_contains(&closed, &at(5.0, 5.0)));

        // a "C" shape: the notch is outside
        let c = Polygon::new(vec![
            at(0.0, 0.0),
            at(10.0, 0.0),
            at(10.0, 3.0),
            at(3.0, 3.0),
            at(3.0, 7.0),
            at(10.0, 7.0),
            at(10.0, 10.0),
            at(0.0, 10.0),
        ]);
        assert!(polygon_contains(&c, &at(1.0, 5.0)));
        assert!(!polygon_contains(&c, &at(6.0, 5.0)));
    }

    #[test]
    fn degenerate_rings_contain_nothing() {
        assert!(!polygon_contains(&Polygon::default(), &at(0.0, 0.0)));
        let line = Polygon::new(vec![at(0.0, 0.0), at(1.0, 1.0)]);
        assert!(!polygon_contains(&line, &at(0.5, 0.5)));
    }

    #[test]
    fn touching_pairs_keep_nearest_origin_vertex() {
        let levels = AdminLevelCollection::from_pairs([(0, "Ukraine")]).unwrap();
        let left = Arc::new(
            Place::new(Address::new("en", levels.clone())).with_polygon(rect(30.0, 50.0, 30.01, 50.01)),
        );
        let right = Arc::new(
            Place::new(Address::new("en", levels)).with_polygon(rect(30.0101, 50.0, 30.02, 50.01)),
        );

        let pairs = touching_pairs(&left, &right, 0.05);
        // only the two west vertices of `right` are near `left`
        assert_eq!(pairs.len(), 2);
        for pair in &pairs {
            assert!(pair.distance() <= 0.05);
            assert_eq!(pair.coordinates_a().longitude(), 30.01);
            assert_eq!(pair.coordinates_b().longitude(), 30.0101);
        }

        assert!(touching_pairs(&left, &right, 0.001).is_empty());
    }
}

//! Boundary contact between neighboring places.

use geoindex_core::storage::{CacheStorage, MemoryCache};
use geoindex_core::{
    Address, AdminLevelCollection, Coordinates, DBConfig, Location, Place, Polygon,
};

type MemLocation = Location<CacheStorage<MemoryCache>>;

fn rect(west: f64, south: f64, east: f64, north: f64) -> Polygon {
    [(west, south), (east, south), (east, north), (west, north)]
        .into_iter()
        .map(|(lon, lat)| Coordinates::new(lon, lat).unwrap())
        .collect()
}

fn district(name: &str, polygon: Polygon) -> Place {
    let levels =
        AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv"), (3, name)]).unwrap();
    Place::new(Address::new("en", levels)).with_polygon(polygon)
}

// Pechersk with Holosiiv directly east of it, Obolon far to the north and a
// city-level place covering all of them.
fn kyiv() -> (MemLocation, Place, Place, Place) {
    let config = DBConfig::default();
    let storage = CacheStorage::open(MemoryCache::new(), &config).unwrap();
    let location = Location::open(storage, config).unwrap();

    let mut pechersk = district("Pechersk", rect(30.50, 50.40, 30.55, 50.45));
    let mut holosiiv = district("Holosiiv", rect(30.5502, 50.40, 30.60, 50.45));
    let mut obolon = district("Obolon", rect(30.48, 50.50, 30.53, 50.55));
    let mut city = Place::new(Address::new(
        "en",
        AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv")]).unwrap(),
    ))
    .with_polygon(rect(30.20, 50.20, 30.80, 50.60));

    for place in [&mut pechersk, &mut holosiiv, &mut obolon, &mut city] {
        location.add_place(place).unwrap();
    }
    (location, pechersk, holosiiv, obolon)
}

#[test]
fn adjacent_district_touches() {
    let (location, pechersk, holosiiv, _) = kyiv();

    let pairs = location.find_touched_places(&pechersk, 0.05, &[]).unwrap();
    // the two western corners of Holosiiv; the city sits on another level
    assert_eq!(pairs.len(), 2);
    for pair in &pairs {
        assert!(pair.place_a().is_same(&pechersk));
        assert!(pair.place_b().is_same(&holosiiv));
        assert!(pair.distance() <= 0.05);
        assert_eq!(pair.coordinates_a().longitude(), 30.55);
        assert_eq!(pair.coordinates_b().longitude(), 30.5502);
    }
}

#[test]
fn radius_controls_contact() {
    let (location, pechersk, _, obolon) = kyiv();
    assert!(location
        .find_touched_places(&pechersk, 0.001, &[])
        .unwrap()
        .is_empty());

    // Obolon's southern corners are just under 6 km away
    let wide = location.find_touched_places(&pechersk, 6.0, &[]).unwrap();
    assert!(!wide.filter_by_place(&obolon).is_empty());
    assert!(wide.iter().all(|p| p.distance() <= 6.0));
}

#[test]
fn explicit_candidates_replace_the_level_scan() {
    let (location, pechersk, holosiiv, obolon) = kyiv();

    let pairs = location
        .find_touched_places(&pechersk, 0.05, &[obolon.clone()])
        .unwrap();
    assert!(pairs.is_empty());

    let pairs = location
        .find_touched_places(&pechersk, 0.05, &[holosiiv.clone(), pechersk.clone()])
        .unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs.filter_by_place(&holosiiv).len(), 2);
}

#[test]
fn nearest_pair_first() {
    let (location, pechersk, holosiiv, _) = kyiv();
    let pairs = location.find_touched_places(&pechersk, 0.05, &[]).unwrap();

    let north = Coordinates::new(30.5501, 50.449).unwrap();
    let sorted = pairs.sort_nearest_pair(&north, Some(&pechersk));
    assert_eq!(sorted.len(), 2);
    let first = sorted.iter().next().unwrap();
    assert_eq!(first.coordinates_b().latitude(), 50.45);
    assert!(first.place_b().is_same(&holosiiv));

    let south = Coordinates::new(30.5501, 50.401).unwrap();
    let sorted = pairs.sort_nearest_pair(&south, None);
    assert_eq!(sorted.iter().next().unwrap().coordinates_a().latitude(), 50.40);
}

#[test]
fn distance_between_points() {
    let a = Coordinates::with_altitude(30.520620, 50.455414, 172.6).unwrap();
    let b = Coordinates::with_altitude(30.557294, 50.434596, 190.8).unwrap();
    let d = MemLocation::distance(&a, &b);
    assert!((d - 3.4799019034641283).abs() < 1e-9);
}

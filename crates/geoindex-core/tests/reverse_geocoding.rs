//! Reverse lookups over nested Düsseldorf polygons (city, district, square).
#![cfg(feature = "json")]

use geoindex_core::loader::{load_place, load_places_from_dir};
use geoindex_core::storage::{CacheStorage, MemoryCache};
use geoindex_core::{Coordinates, DBConfig, Location, Place, ReverseQuery};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn location() -> Location<CacheStorage<MemoryCache>> {
    let config = DBConfig::default();
    let storage = CacheStorage::open(MemoryCache::new(), &config).unwrap();
    let location = Location::open(storage, config).unwrap();
    for mut place in load_places_from_dir(fixtures()).unwrap() {
        location.add_place(&mut place).unwrap();
    }
    location
}

// (latitude, longitude) as they are usually quoted
fn reverse(location: &Location<CacheStorage<MemoryCache>>, lat: f64, lon: f64, locale: &str) -> Place {
    location
        .reverse(&Coordinates::new(lon, lat).unwrap(), locale)
        .unwrap()
        .unwrap_or_else(|| panic!("nothing found at {lat}, {lon}"))
}

#[test]
fn fixtures_load_with_every_locale() {
    let places = load_places_from_dir(fixtures()).unwrap();
    assert_eq!(places.len(), 3);
    for place in &places {
        assert_eq!(place.primary_locale(), "en");
        assert!(place.address("de").is_some());
        assert_eq!(place.provided_by(), "OpenStreetMap contributors");
        assert_eq!(place.polygons().len(), 1);
    }
}

#[test]
fn city_level_point() {
    let location = location();
    let place = reverse(&location, 51.227546, 6.784593, "en");
    let address = place.primary_address();
    assert_eq!(address.street_name(), "");
    assert_eq!(address.sub_locality(), "Dusseldorf");
    assert_eq!(address.locality(), "North Rhine-Westphalia");
    assert_eq!(place.postal_code(), None);
    assert_eq!(address.max_admin_level(), 2);
}

#[test]
fn most_specific_polygon_wins() {
    let location = location();

    let square = reverse(&location, 51.2314767, 6.7473107, "en");
    let address = square.primary_address();
    assert_eq!(address.street_number(), "1");
    assert_eq!(address.street_name(), "Belsenplatz");
    assert_eq!(square.postal_code(), Some("40545"));

    let district = reverse(&location, 51.2314260099, 6.7617290099, "en");
    assert_eq!(district.primary_address().street_name(), "");
    assert_eq!(district.primary_address().sub_locality(), "Dusseldorf");
    assert_eq!(district.postal_code(), Some("40545"));
    assert_eq!(district.primary_address().max_admin_level(), 3);
}

#[test]
fn german_names_through_query() {
    let location = location();
    let query = ReverseQuery::new(Coordinates::new(6.784593, 51.227546).unwrap()).with_locale("de");
    let place = location.reverse_query(&query).unwrap().unwrap();
    let address = place.address("de").unwrap();
    assert_eq!(address.sub_locality(), "Düsseldorf");
    assert_eq!(address.locality(), "Nordrhein-Westfalen");
    assert_eq!(address.country().and_then(|c| c.name()), Some("Deutschland"));
}

#[test]
fn outside_every_polygon() {
    let location = location();
    let far = Coordinates::new(13.404954, 52.520008).unwrap();
    assert!(location.reverse(&far, "en").unwrap().is_none());

    let empty = {
        let config = DBConfig::default();
        let storage = CacheStorage::open(MemoryCache::new(), &config).unwrap();
        Location::open(storage, config).unwrap()
    };
    let inside = Coordinates::new(6.78, 51.22).unwrap();
    assert!(empty.reverse(&inside, "en").unwrap().is_none());
}

#[test]
fn deleted_places_stop_matching() {
    let location = location();
    let square = reverse(&location, 51.2314767, 6.7473107, "en");
    assert!(location.delete_place(&square).unwrap());

    let fallback = reverse(&location, 51.2314767, 6.7473107, "en");
    assert_eq!(fallback.primary_address().max_admin_level(), 3);
}

#[test]
fn single_file_load_matches_directory_load() {
    let place = load_place(fixtures().join("dusseldorf_belsenplatz.json")).unwrap();
    let from_dir = load_places_from_dir(fixtures()).unwrap();
    assert!(from_dir.contains(&place));
}

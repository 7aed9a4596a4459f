//! Error handling example for geoindex-rs
//!
//! This example demonstrates the error taxonomy and edge cases

use geoindex_core::storage::{CacheStorage, MemoryCache};
use geoindex_core::{
    Address, AdminLevel, AdminLevelCollection, Coordinates, Country, DBConfig, GeoError,
    Location, Place, PlaceId, Result,
};

fn main() -> Result<()> {
    println!("=== geoindex-rs Error Handling Example ===\n");

    // Example 1: Invalid values are rejected on construction
    println!("--- Example 1: Validation errors ---");
    for (lon, lat) in [(181.0, 0.0), (0.0, -91.0), (f64::NAN, 0.0)] {
        match Coordinates::new(lon, lat) {
            Ok(c) => println!("  Accepted: {c:?}"),
            Err(e) => println!("  Rejected ({lon}, {lat}): {e}"),
        }
    }
    let duplicate = AdminLevelCollection::new([AdminLevel::new(2, "Kyiv"), AdminLevel::new(2, "Lviv")]);
    if let Err(e) = duplicate {
        println!("  Rejected admin levels: {e}");
    }
    if let Err(e) = Country::new(None, None) {
        println!("  Rejected country: {e}");
    }
    println!();

    // Example 2: Invalid configuration
    println!("--- Example 2: Configuration errors ---");
    let bad = DBConfig {
        section_glue: String::new(),
        ..DBConfig::default()
    };
    let storage = CacheStorage::open(MemoryCache::new(), &DBConfig::default())?;
    match Location::open(storage, bad) {
        Err(GeoError::Config(msg)) => println!("  Refused to open: {msg}"),
        Err(e) => return Err(e),
        Ok(_) => println!("  Unexpectedly opened"),
    }
    println!();

    let config = DBConfig::default();
    let storage = CacheStorage::open(MemoryCache::new(), &config)?;
    let location = Location::open(storage, config)?;

    // Example 3: Missing records
    println!("--- Example 3: Missing records ---");
    match location.get_place(&PlaceId::new("no-such-place")) {
        Err(e) if e.is_not_found() => println!("  {e}"),
        Err(e) => return Err(e),
        Ok(place) => println!("  Found {:?}", place.id()),
    }

    let levels = AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv")])?;
    let never_added = Place::new(Address::new("en", levels));
    match location.update_place(&never_added) {
        Err(e) if e.is_not_found() => println!("  Update refused: {e}"),
        other => println!("  Unexpected: {other:?}"),
    }
    println!("  Deleting a place that was never added: {}", location.delete_place(&never_added)?);
    println!();

    // Example 4: Empty answers are not errors
    println!("--- Example 4: Empty answers ---");
    println!("  geocode on an empty store: {:?}", location.geocode("kyiv", 10, "en")?);
    let nowhere = Coordinates::new(0.0, 0.0)?;
    println!("  reverse on an empty store: {:?}", location.reverse(&nowhere, "en")?);
    match location.find_child_places(&AdminLevelCollection::default(), "en") {
        Err(GeoError::Validation(msg)) => println!("  children of nothing: {msg}"),
        other => println!("  Unexpected: {other:?}"),
    }

    Ok(())
}

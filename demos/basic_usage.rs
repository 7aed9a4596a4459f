//! Basic usage example for geoindex-rs
//!
//! This example demonstrates how to:
//! - Open an in-memory store and add places in two locales
//! - Look places up by text
//! - Find the place containing a point
//! - Find neighbors and child places

use geoindex_core::storage::{CacheStorage, MemoryCache};
use geoindex_core::{
    Address, AdminLevelCollection, Coordinates, Country, DBConfig, Location, Place, Polygon,
    Result,
};

fn rect(west: f64, south: f64, east: f64, north: f64) -> Result<Polygon> {
    [(west, south), (east, south), (east, north), (west, north)]
        .into_iter()
        .map(|(lon, lat)| Coordinates::new(lon, lat))
        .collect()
}

fn district(en: &str, uk: &str, polygon: Polygon) -> Result<Place> {
    let english = Address::new(
        "en",
        AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv"), (3, en)])?,
    )
    .with_country(Country::named("Ukraine", "UA"))
    .with_locality("Kyiv")
    .with_sub_locality(en);
    let ukrainian = Address::new(
        "uk",
        AdminLevelCollection::from_pairs([(0, "Україна"), (2, "Київ"), (3, uk)])?,
    )
    .with_country(Country::named("Україна", "UA"))
    .with_locality("Київ")
    .with_sub_locality(uk);

    Ok(Place::from_addresses([english, ukrainian], "en")?.with_polygon(polygon))
}

fn main() -> Result<()> {
    println!("=== geoindex-rs Basic Usage Example ===\n");

    let config = DBConfig::default();
    let storage = CacheStorage::open(MemoryCache::new(), &config)?;
    let location = Location::open(storage, config)?;

    // Example 1: Add places
    println!("--- Example 1: Add places ---");
    let mut places = vec![
        district("Pechersk", "Печерськ", rect(30.50, 50.40, 30.55, 50.45)?)?,
        district("Holosiiv", "Голосіїв", rect(30.5502, 50.40, 30.60, 50.45)?)?,
        district("Obolon", "Оболонь", rect(30.48, 50.50, 30.53, 50.55)?)?,
    ];
    for place in &mut places {
        location.add_place(place)?;
        println!(
            "Added {} as {}",
            place.primary_address().sub_locality(),
            place.id().map_or("-", |id| id.as_str())
        );
    }
    println!("Known admin levels: {:?}\n", location.get_admin_levels());

    // Example 2: Forward lookup
    println!("--- Example 2: Geocode by text ---");
    for place in location.geocode("kyiv pechersk", 10, "en")? {
        println!("  {}", place.primary_address().sub_locality());
    }
    println!();

    // Example 3: Reverse lookup
    println!("--- Example 3: Reverse geocode ---");
    let point = Coordinates::new(30.52, 50.43)?;
    match location.reverse(&point, "uk")? {
        Some(place) => {
            let address = place.address_or_primary("uk");
            println!("  {point:?} is in {}", address.sub_locality());
        }
        None => println!("  Nothing contains {point:?}"),
    }
    println!();

    // Example 4: Neighbors
    println!("--- Example 4: Places touching Pechersk (within 50 m) ---");
    let pairs = location.find_touched_places(&places[0], 0.05, &[])?;
    for pair in &pairs {
        println!(
            "  {} at {:.1} m",
            pair.place_b().primary_address().sub_locality(),
            pair.distance() * 1000.0
        );
    }
    println!();

    // Example 5: Children of an admin path
    println!("--- Example 5: Children of Ukraine / Kyiv ---");
    let kyiv = AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv")])?;
    println!("  {} districts", location.find_child_places(&kyiv, "en")?.len());

    Ok(())
}

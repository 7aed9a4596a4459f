//! Text lookups, ranking, paging and child-place discovery.

use geoindex_core::storage::{CacheStorage, MemoryCache};
use geoindex_core::{
    Address, AdminLevelCollection, Country, DBConfig, GeoError, GeocodeQuery, Location, Place,
};

type MemLocation = Location<CacheStorage<MemoryCache>>;

fn location_with(config: DBConfig) -> MemLocation {
    let storage = CacheStorage::open(MemoryCache::new(), &config).unwrap();
    Location::open(storage, config).unwrap()
}

fn street(levels: &[(i32, &str)], street: &str, number: &str) -> Place {
    let address = Address::new("en", AdminLevelCollection::from_pairs(levels.iter().copied()).unwrap())
        .with_country(Country::named("Ukraine", "UA"))
        .with_locality("Kyiv")
        .with_street_name(street)
        .with_street_number(number);
    let uk = Address::new(
        "uk",
        AdminLevelCollection::from_pairs([(0, "Україна"), (2, "Київ")]).unwrap(),
    )
    .with_street_name(street);
    Place::from_addresses([address, uk], "en").unwrap()
}

const PECHERSK: &[(i32, &str)] = &[(0, "Ukraine"), (2, "Kyiv"), (3, "Pechersk")];
const PODIL: &[(i32, &str)] = &[(0, "Ukraine"), (2, "Kyiv"), (3, "Podil")];
const LYPKY: &[(i32, &str)] = &[(0, "Ukraine"), (2, "Kyiv"), (3, "Pechersk"), (4, "Lypky")];

// Khreshchatyk in Pechersk, Lypska in Pechersk, Khreshchatyk in Podil
fn kyiv() -> (MemLocation, Vec<Place>) {
    let location = location_with(DBConfig::default());
    let mut places = vec![
        street(PECHERSK, "Khreshchatyk", "1"),
        street(PECHERSK, "Lypska", "5"),
        street(PODIL, "Khreshchatyk", "40"),
    ];
    for place in &mut places {
        location.add_place(place).unwrap();
    }
    (location, places)
}

#[test]
fn best_match_comes_first() {
    let (location, places) = kyiv();

    let hits = location.geocode("Pechersk Khreshchatyk", 10, "en").unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits[0].is_same(&places[0]));
    // equal scores keep key order: "level-3-pechersk" < "level-3-podil"
    assert!(hits[1].is_same(&places[1]));
    assert!(hits[2].is_same(&places[2]));
}

#[test]
fn unmatched_text_finds_nothing() {
    let (location, _) = kyiv();
    assert!(location.geocode("Lviv", 10, "en").unwrap().is_empty());
    assert!(location.geocode("kyiv", 10, "fr").unwrap().is_empty());
}

#[test]
fn lookups_are_case_and_encoding_insensitive() {
    let (location, _) = kyiv();
    let plain = location.geocode("khreshchatyk", 10, "en").unwrap();
    assert_eq!(plain.len(), 2);
    assert_eq!(location.geocode("  KHRESHCHATYK ", 10, "en").unwrap(), plain);
    assert_eq!(location.geocode("Khreshchatyk%20", 10, "en").unwrap(), plain);
}

#[test]
fn localized_lookup_through_query() {
    let (location, _) = kyiv();
    let query = GeocodeQuery::new("Khreshchatyk").with_locale("uk").with_limit(0);
    let hits = location.geocode_query(&query).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|p| p.address("uk").is_some()));

    // no locale on the query means the configured default
    let query = GeocodeQuery::new("lypska");
    let hits = location.geocode_query(&query).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].primary_address().street_number(), "5");
}

#[test]
fn limit_and_pages() {
    let (location, _) = kyiv();
    assert_eq!(location.geocode("kyiv", 2, "en").unwrap().len(), 2);

    let db = location.database();
    let first = db.get("kyiv", 0, 2, "en", None).unwrap();
    let second = db.get("kyiv", 1, 2, "en", None).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert!(db.get("kyiv", 2, 2, "en", None).unwrap().is_empty());
    assert!(first.iter().all(|p| !p.is_same(&second[0])));
}

#[test]
fn response_size_is_capped() {
    let location = location_with(DBConfig {
        max_places_in_one_response: 2,
        ..DBConfig::default()
    });
    for number in ["1", "2", "3", "4"] {
        location.add_place(&mut street(PECHERSK, "Khreshchatyk", number)).unwrap();
    }
    assert_eq!(location.geocode("khreshchatyk", 30, "en").unwrap().len(), 2);
}

#[test]
fn level_filter_restricts_candidates() {
    let (location, _) = kyiv();
    let mut deep = street(LYPKY, "Shovkovychna", "12");
    location.add_place(&mut deep).unwrap();

    let db = location.database();
    assert_eq!(db.get("kyiv", 0, 10, "en", Some(3)).unwrap().len(), 3);
    let level4 = db.get("kyiv", 0, 10, "en", Some(4)).unwrap();
    assert_eq!(level4.len(), 1);
    assert!(level4[0].is_same(&deep));
    assert!(db.get("kyiv", 0, 10, "en", Some(7)).unwrap().is_empty());
    assert_eq!(location.get_admin_levels(), vec![0, 2, 3, 4]);
}

#[test]
fn child_places_go_deeper_than_the_given_levels() {
    let (location, places) = kyiv();
    let mut deep = street(LYPKY, "Shovkovychna", "12");
    location.add_place(&mut deep).unwrap();

    let kyiv_levels = AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv")]).unwrap();
    assert_eq!(location.find_child_places(&kyiv_levels, "en").unwrap().len(), 4);

    let pechersk = AdminLevelCollection::from_pairs(PECHERSK.iter().copied()).unwrap();
    let children = location.find_child_places(&pechersk, "en").unwrap();
    assert_eq!(children.len(), 1);
    assert!(children[0].is_same(&deep));
    assert!(!children.iter().any(|c| c.is_same(&places[0])));

    let lviv = AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Lviv")]).unwrap();
    assert!(location.find_child_places(&lviv, "en").unwrap().is_empty());

    assert!(matches!(
        location.find_child_places(&AdminLevelCollection::default(), "en"),
        Err(GeoError::Validation(_))
    ));
}

#[test]
fn updated_places_are_found_under_new_names() {
    let (location, mut places) = kyiv();
    let place = &mut places[1];
    let renamed = place
        .primary_address()
        .clone()
        .with_street_name("Instytutska");
    place.set_address(renamed);
    location.update_place(place).unwrap();

    assert!(location.geocode("lypska", 10, "en").unwrap().is_empty());
    let hits = location.geocode("instytutska", 10, "en").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), place.id());
}

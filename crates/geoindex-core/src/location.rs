// crates/geoindex-core/src/location.rs
//! Public query API: forward, reverse and neighbor lookups over a
//! [`Database`].

use crate::config::DBConfig;
use crate::database::Database;
use crate::error::{GeoError, Result};
use crate::keys::KeyParts;
use crate::model::{
    Address, AdminLevel, AdminLevelCollection, Coordinates, PairedCoordinatesCollection, Place,
    PlaceId,
};
use crate::query::{GeocodeQuery, ReverseQuery, DEFAULT_GEOCODE_LIMIT};
use crate::spatial::{self, place_contains, touching_pairs};
use crate::text::normalize;
use crate::traits::StorageProvider;
use std::collections::HashSet;
use std::sync::Arc;

/// Page size of [`Location::get_all_places`] when the caller has no opinion.
pub const DEFAULT_PLACES_LIMIT: usize = 50;

/// Geocoding front end.
///
/// ```
/// use geoindex_core::{
///     storage::{CacheStorage, MemoryCache},
///     Address, AdminLevelCollection, Coordinates, DBConfig, Location, Place, Polygon,
/// };
///
/// let config = DBConfig::default();
/// let storage = CacheStorage::open(MemoryCache::new(), &config)?;
/// let location = Location::open(storage, config)?;
///
/// let levels = AdminLevelCollection::from_pairs([(0, "Ukraine"), (2, "Kyiv")])?;
/// let ring: Polygon = [(30.2, 50.2), (30.8, 50.2), (30.8, 50.6), (30.2, 50.6)]
///     .into_iter()
///     .map(|(lon, lat)| Coordinates::new(lon, lat))
///     .collect::<Result<_, _>>()?;
/// let mut kyiv = Place::new(Address::new("en", levels)).with_polygon(ring);
/// location.add_place(&mut kyiv)?;
///
/// assert_eq!(location.geocode("kyiv", 10, "en")?.len(), 1);
/// let hit = location.reverse(&Coordinates::new(30.52, 50.45)?, "en")?;
/// assert!(hit.is_some_and(|p| p.is_same(&kyiv)));
/// # Ok::<(), geoindex_core::GeoError>(())
/// ```
pub struct Location<S: StorageProvider> {
    db: Database<S>,
}

impl<S: StorageProvider> Location<S> {
    pub fn new(db: Database<S>) -> Self {
        Self { db }
    }

    pub fn open(storage: S, config: DBConfig) -> Result<Self> {
        Ok(Self::new(Database::open(storage, config)?))
    }

    pub fn database(&self) -> &Database<S> {
        &self.db
    }

    pub fn into_database(self) -> Database<S> {
        self.db
    }

    fn default_locale(&self) -> &str {
        &self.db.config().default_locale
    }

    pub fn add_place(&self, place: &mut Place) -> Result<bool> {
        self.db.add(place)
    }

    pub fn update_place(&self, place: &Place) -> Result<bool> {
        self.db.update(place)
    }

    pub fn delete_place(&self, place: &Place) -> Result<bool> {
        self.db.delete(place)
    }

    pub fn get_all_places(&self, offset: usize, limit: usize) -> Result<Vec<Place>> {
        self.db.get_all_places(offset, limit)
    }

    pub fn get_place(&self, id: &PlaceId) -> Result<Place> {
        self.db.get_place(id)
    }

    pub fn get_admin_levels(&self) -> Vec<i32> {
        self.db.get_admin_levels()
    }

    /// Kilometers between two points.
    pub fn distance(a: &Coordinates, b: &Coordinates) -> f64 {
        spatial::distance(a, b)
    }

    /// Places whose keys best match `text`, best first. A `limit` of 0 means
    /// the default of 30.
    pub fn geocode(&self, text: &str, limit: usize, locale: &str) -> Result<Vec<Place>> {
        let limit = if limit == 0 { DEFAULT_GEOCODE_LIMIT } else { limit };
        self.db.get(&normalize(text), 0, limit, locale, None)
    }

    pub fn geocode_query(&self, query: &GeocodeQuery) -> Result<Vec<Place>> {
        let locale = query.locale().unwrap_or(self.default_locale());
        self.geocode(query.text(), query.limit(), locale)
    }

    /// Every place filed under `level` for `locale`, in search order.
    fn places_at_level(&self, level: i32, locale: &str) -> Result<Vec<Place>> {
        let mut places = Vec::new();
        self.for_each_at_level(level, locale, |page| {
            places.extend(page);
            true
        })?;
        Ok(places)
    }

    // Pages through the places filed under `level`; `visit` returns false to
    // stop early.
    fn for_each_at_level(
        &self,
        level: i32,
        locale: &str,
        mut visit: impl FnMut(Vec<Place>) -> bool,
    ) -> Result<()> {
        let filter = AdminLevelCollection::new([AdminLevel::new(level, "")])?;
        let key = self
            .db
            .key_compiler()
            .compile(&Address::new(locale, filter), KeyParts::LEVELS);
        let page_size = self.db.config().max_places_in_one_response;

        for page in 0.. {
            let places = self.db.get(&key, page, page_size, locale, Some(level))?;
            if places.is_empty() || !visit(places) {
                break;
            }
        }
        Ok(())
    }

    /// Most specific stored place containing `point`.
    ///
    /// Known levels are walked from the most general one. At each level the
    /// first containing candidate becomes the match; a candidate is only
    /// considered when it is strictly more specific than the current match.
    pub fn reverse(&self, point: &Coordinates, locale: &str) -> Result<Option<Place>> {
        let mut best: Option<(i32, Place)> = None;

        for level in self.db.get_admin_levels() {
            log::debug!("reverse walk at level {level}");
            let mut found = None;
            self.for_each_at_level(level, locale, |candidates| {
                for candidate in candidates {
                    let specificity = candidate.max_admin_level(locale);
                    if matches!(&best, Some((best_level, _)) if specificity <= *best_level) {
                        continue;
                    }
                    if place_contains(&candidate, point) {
                        found = Some((specificity, candidate));
                        return false;
                    }
                }
                true
            })?;
            if found.is_some() {
                best = found;
            }
        }

        Ok(best.map(|(_, place)| place))
    }

    pub fn reverse_query(&self, query: &ReverseQuery) -> Result<Option<Place>> {
        let locale = query.locale().unwrap_or(self.default_locale());
        self.reverse(query.coordinates(), locale)
    }

    /// Vertex pairs where a candidate's boundary comes within
    /// `max_distance_km` of `original`'s boundary.
    ///
    /// With no `candidates`, every stored place at the same admin level as
    /// `original` is checked. `original` itself is always skipped.
    pub fn find_touched_places(
        &self,
        original: &Place,
        max_distance_km: f64,
        candidates: &[Place],
    ) -> Result<PairedCoordinatesCollection> {
        let locale = original.primary_locale();
        let sourced;
        let candidates = if candidates.is_empty() {
            sourced = self.places_at_level(original.max_admin_level(locale), locale)?;
            sourced.as_slice()
        } else {
            candidates
        };

        let original = Arc::new(original.clone());
        let mut pairs = PairedCoordinatesCollection::default();
        for candidate in candidates.iter().filter(|c| !c.is_same(&original)) {
            let candidate = Arc::new(candidate.clone());
            for pair in touching_pairs(&original, &candidate, max_distance_km) {
                pairs.push(pair);
            }
        }
        log::debug!(
            "{} touching vertex pairs within {max_distance_km} km",
            pairs.len()
        );
        Ok(pairs)
    }

    /// Stored places below `levels`: their address in `locale` has every
    /// given level with the same name and goes deeper than the deepest one.
    pub fn find_child_places(
        &self,
        levels: &AdminLevelCollection,
        locale: &str,
    ) -> Result<Vec<Place>> {
        let Some(deepest) = levels.max_level() else {
            return Err(GeoError::validation(
                "child lookup needs at least one admin level",
            ));
        };
        let key = self
            .db
            .key_compiler()
            .compile(&Address::new(locale, levels.clone()), KeyParts::LEVELS);
        let page_size = self.db.config().max_places_in_one_response;

        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for page in 0.. {
            let places = self.db.get(&key, page, page_size, locale, None)?;
            if places.is_empty() {
                break;
            }
            for place in places {
                let Some(address) = place.address(locale) else {
                    continue;
                };
                let is_child = address.max_admin_level() > deepest
                    && address.admin_levels().contains_levels(levels);
                if is_child && place.id().map_or(true, |id| seen.insert(id.clone())) {
                    children.push(place);
                }
            }
        }
        Ok(children)
    }
}

// crates/geoindex-core/src/index.rs
//! In-memory secondary index: locale → admin level → compiled key → place id.

use crate::error::{GeoError, Result};
use crate::model::PlaceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the secondary index, as persisted by a storage provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub locale: String,
    pub level: i32,
    pub key: String,
    pub place_id: PlaceId,
}

type Bucket = BTreeMap<String, PlaceId>;

/// Key lookup structure shared by every storage provider.
///
/// Buckets and keys are ordered, so iterating the index is deterministic:
/// levels ascending, keys lexicographic inside a level.
#[derive(Clone, Debug, Default)]
pub struct SecondaryIndex {
    locales: BTreeMap<String, BTreeMap<i32, Bucket>>,
}

impl SecondaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = IndexEntry>) -> Self {
        let mut index = Self::new();
        index.insert_all(entries);
        index
    }

    /// Later entries win on key collisions.
    pub fn insert(&mut self, entry: IndexEntry) {
        self.locales
            .entry(entry.locale)
            .or_default()
            .entry(entry.level)
            .or_default()
            .insert(entry.key, entry.place_id);
    }

    pub fn insert_all(&mut self, entries: impl IntoIterator<Item = IndexEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Drops every entry pointing at `id`, in every locale. Returns how many
    /// were removed.
    pub fn remove_place(&mut self, id: &PlaceId) -> usize {
        let mut removed = 0;
        for levels in self.locales.values_mut() {
            for bucket in levels.values_mut() {
                let before = bucket.len();
                bucket.retain(|_, owner| owner != id);
                removed += before - bucket.len();
            }
            levels.retain(|_, bucket| !bucket.is_empty());
        }
        self.locales.retain(|_, levels| !levels.is_empty());
        removed
    }

    pub fn contains_id(&self, id: &PlaceId) -> bool {
        self.locales
            .values()
            .flat_map(BTreeMap::values)
            .any(|bucket| bucket.values().any(|owner| owner == id))
    }

    /// `(level, key)` pairs of one locale, optionally restricted to one level.
    pub fn keys(&self, locale: &str, level: Option<i32>) -> Vec<(i32, &str)> {
        let Some(levels) = self.locales.get(locale) else {
            return Vec::new();
        };
        levels
            .iter()
            .filter(|(l, _)| level.map_or(true, |wanted| **l == wanted))
            .flat_map(|(l, bucket)| bucket.keys().map(move |k| (*l, k.as_str())))
            .collect()
    }

    /// First level, ascending, whose bucket holds `key` for `locale`.
    pub fn level_of(&self, locale: &str, key: &str) -> Result<i32> {
        self.locales
            .get(locale)
            .and_then(|levels| {
                levels
                    .iter()
                    .find(|(_, bucket)| bucket.contains_key(key))
                    .map(|(level, _)| *level)
            })
            .ok_or_else(|| {
                GeoError::not_found(format!("no admin level holds key '{key}' for locale '{locale}'"))
            })
    }

    pub fn get(&self, locale: &str, level: i32, key: &str) -> Option<&PlaceId> {
        self.locales.get(locale)?.get(&level)?.get(key)
    }

    /// Number of keys across all locales.
    pub fn len(&self) -> usize {
        self.locales
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Levels that have at least one key, ascending.
    pub fn levels(&self) -> Vec<i32> {
        let mut levels: Vec<i32> = self
            .locales
            .values()
            .flat_map(|l| l.keys().copied())
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }
}

// crates/geoindex-core/src/database.rs
//! The index: a [`StorageProvider`] plus the in-memory secondary index kept
//! in step with it.

use crate::config::DBConfig;
use crate::error::{GeoError, Result};
use crate::index::{IndexEntry, SecondaryIndex};
use crate::keys::{KeyCompiler, KeyParts};
use crate::model::{Address, Place, PlaceId};
use crate::search::search;
use crate::traits::StorageProvider;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;

/// Runs `f` inside a storage transaction, rolling back on any failure and
/// handing the original error back.
fn in_transaction<S, T>(storage: &mut S, op: &str, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T>
where
    S: StorageProvider,
{
    storage.begin_transaction()?;
    let result = f(storage).and_then(|value| storage.commit().map(|()| value));
    if let Err(e) = &result {
        log::warn!("{op} rolled back: {e}");
        if let Err(rb) = storage.rollback() {
            log::error!("rollback after failed {op} failed too: {rb}");
        }
    }
    result
}

/// Place store with key lookup.
///
/// Writers hold the storage lock for the whole transaction and take the
/// index lock only after the commit, so the index never names a record the
/// store does not have. Readers resolve keys under the index lock and fetch
/// records afterwards.
pub struct Database<S: StorageProvider> {
    keys: KeyCompiler,
    index: RwLock<SecondaryIndex>,
    storage: Mutex<S>,
}

impl<S: StorageProvider> Database<S> {
    /// Validates `config` and rebuilds the index from what `storage` holds.
    pub fn open(storage: S, config: DBConfig) -> Result<Self> {
        let keys = KeyCompiler::new(config.prepared()?);
        keys.register_levels(storage.list_all_known_admin_levels()?);

        let entries = storage.list_all_secondary_index_entries()?;
        keys.register_levels(entries.iter().map(|e| e.level));
        let index = SecondaryIndex::from_entries(entries);
        log::info!(
            "index rebuilt: {} keys, admin levels {:?}",
            index.len(),
            keys.known_levels()
        );

        Ok(Self {
            keys,
            index: RwLock::new(index),
            storage: Mutex::new(storage),
        })
    }

    pub fn config(&self) -> &DBConfig {
        self.keys.config()
    }

    pub fn key_compiler(&self) -> &KeyCompiler {
        &self.keys
    }

    /// Gives the storage provider back, e.g. to reopen it later.
    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }

    pub fn compile_key(
        &self,
        address: &Address,
        use_levels: bool,
        use_prefix: bool,
        use_address: bool,
    ) -> String {
        self.keys.compile_key(address, use_levels, use_prefix, use_address)
    }

    pub fn compile_keys(
        &self,
        place: &Place,
        use_levels: bool,
        use_prefix: bool,
        use_address: bool,
    ) -> BTreeMap<String, String> {
        self.keys.compile_keys(place, use_levels, use_prefix, use_address)
    }

    // One entry per locale, filed under the most specific level of that
    // locale's address.
    fn index_entries(&self, place: &Place, id: &PlaceId) -> Vec<IndexEntry> {
        place
            .addresses()
            .iter()
            .map(|(locale, address)| IndexEntry {
                locale: locale.clone(),
                level: address.max_admin_level(),
                key: self.keys.compile(address, KeyParts::INDEX),
                place_id: id.clone(),
            })
            .collect()
    }

    // An id is free only when the store positively reports it missing; any
    // other fetch failure is the caller's problem.
    fn fresh_id(&self, storage: &S) -> Result<PlaceId> {
        loop {
            let id = PlaceId::generate();
            if !self.index.read().contains_id(&id) {
                match storage.fetch_place_by_id(&id) {
                    Err(e) if e.is_not_found() => return Ok(id),
                    Err(e) => return Err(e),
                    Ok(_) => {}
                }
            }
            log::debug!("generated id {id} is taken, retrying");
        }
    }

    /// Persists `place` under a new identifier and indexes it.
    ///
    /// The identifier is written into `place` only once the record is
    /// committed; on failure `place` is left untouched.
    pub fn add(&self, place: &mut Place) -> Result<bool> {
        let mut storage = self.storage.lock();
        let id = self.fresh_id(&storage)?;
        let staged = place.clone().with_id(id.clone());
        let entries = self.index_entries(&staged, &id);

        in_transaction(&mut *storage, "add", |s| s.persist_place(&staged, &entries))?;
        self.index.write().insert_all(entries);

        log::debug!("added place {id}");
        place.id = Some(id);
        Ok(true)
    }

    /// Replaces the stored record of `place`, keeping its identifier.
    ///
    /// Fails with [`GeoError::NotFound`] when `place` has no identifier or
    /// nothing is stored under it.
    pub fn update(&self, place: &Place) -> Result<bool> {
        let id = place
            .id()
            .cloned()
            .ok_or_else(|| GeoError::not_found("cannot update a place that was never added"))?;
        let entries = self.index_entries(place, &id);

        let mut storage = self.storage.lock();
        in_transaction(&mut *storage, "update", |s| {
            if !s.delete_place_by_id(&id)? {
                return Err(GeoError::not_found(format!("place {id}")));
            }
            s.persist_place(place, &entries)
        })?;

        let mut index = self.index.write();
        index.remove_place(&id);
        index.insert_all(entries);
        log::debug!("updated place {id}");
        Ok(true)
    }

    /// Removes the record of `place` and every index entry pointing at it.
    /// `false` when nothing was stored.
    pub fn delete(&self, place: &Place) -> Result<bool> {
        let Some(id) = place.id() else {
            return Ok(false);
        };
        let mut storage = self.storage.lock();
        let existed = in_transaction(&mut *storage, "delete", |s| s.delete_place_by_id(id))?;
        let removed = self.index.write().remove_place(id);
        log::debug!("deleted place {id} (record: {existed}, index entries: {removed})");
        Ok(existed)
    }

    /// Ranked lookup.
    ///
    /// `search_key` is scored against the keys of `locale` (only those filed
    /// under `filter_level` when given); page `page` of the ranking is
    /// resolved to places. `max_results` is capped by
    /// [`DBConfig::max_places_in_one_response`].
    pub fn get(
        &self,
        search_key: &str,
        page: usize,
        max_results: usize,
        locale: &str,
        filter_level: Option<i32>,
    ) -> Result<Vec<Place>> {
        let config = self.config();
        let max_results = config.clamp_page_size(max_results);

        let ids = {
            let index = self.index.read();
            search(&index, config, search_key, page, max_results, locale, filter_level)
                .iter()
                .map(|key| {
                    let level = index.level_of(locale, key)?;
                    index
                        .get(locale, level, key)
                        .cloned()
                        .ok_or_else(|| GeoError::not_found(format!("key '{key}'")))
                })
                .collect::<Result<Vec<_>>>()?
        };

        let storage = self.storage.lock();
        let mut places = Vec::with_capacity(ids.len());
        for id in ids {
            match storage.fetch_place_by_id(&id) {
                Ok(place) => places.push(place),
                // deleted between the index read and the fetch
                Err(e) if e.is_not_found() => log::debug!("skipping vanished place {id}"),
                Err(e) => return Err(e),
            }
        }
        Ok(places)
    }

    /// Stored places in insertion order, without any ranking.
    pub fn get_all_places(&self, offset: usize, limit: usize) -> Result<Vec<Place>> {
        self.storage.lock().list_places(offset, limit)
    }

    pub fn get_place(&self, id: &PlaceId) -> Result<Place> {
        self.storage.lock().fetch_place_by_id(id)
    }

    /// Every admin level seen so far, ascending.
    pub fn get_admin_levels(&self) -> Vec<i32> {
        self.keys.known_levels()
    }

    /// Number of keys in the secondary index.
    pub fn index_len(&self) -> usize {
        self.index.read().len()
    }
}

// crates/geoindex-core/src/storage/kv.rs
//! Storage provider on top of any [`KeyValueCache`].
//!
//! Layout inside the cache (`<ns>` is the configured global prefix):
//!
//! - `<ns>.catalog`: ordered place ids and every admin level ever stored
//! - `<ns>.place.<id>`: the place payload plus its own index rows
//!
//! Each record carries its index rows, so the secondary index can be rebuilt
//! from the cache alone.

use super::codec::{write_failed, PlaceCodec, PlacePayload};
use crate::config::DBConfig;
use crate::error::{GeoError, Result};
use crate::index::IndexEntry;
use crate::model::{Place, PlaceId};
use crate::traits::{KeyValueCache, StorageProvider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Catalog {
    places: Vec<PlaceId>,
    admin_levels: BTreeSet<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPlace {
    payload: PlacePayload,
    entries: Vec<IndexEntry>,
}

// Staged writes of an open transaction; `None` marks a deletion.
#[derive(Debug)]
struct Journal {
    catalog: Catalog,
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

pub struct CacheStorage<C: KeyValueCache> {
    cache: C,
    codec: PlaceCodec,
    namespace: String,
    catalog: Catalog,
    journal: Option<Journal>,
}

impl<C: KeyValueCache> CacheStorage<C> {
    /// Opens the store kept in `cache`, reading its catalog when present.
    pub fn open(cache: C, config: &DBConfig) -> Result<Self> {
        let namespace = config.prefix_key();
        let catalog = match cache.get(&catalog_key(&namespace))? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => Catalog::default(),
        };
        log::debug!(
            "cache storage '{namespace}' opened with {} places",
            catalog.places.len()
        );
        Ok(Self {
            cache,
            codec: PlaceCodec::from_config(config),
            namespace,
            catalog,
            journal: None,
        })
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }

    fn record_key(&self, id: &PlaceId) -> String {
        format!("{}.place.{id}", self.namespace)
    }

    fn current_catalog(&self) -> &Catalog {
        self.journal
            .as_ref()
            .map_or(&self.catalog, |journal| &journal.catalog)
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(staged) = self.journal.as_ref().and_then(|j| j.writes.get(key)) {
            return Ok(staged.clone());
        }
        self.cache.get(key)
    }

    fn read_record(&self, id: &PlaceId) -> Result<Option<StoredPlace>> {
        self.read(&self.record_key(id))?
            .map(|bytes| bincode::deserialize(&bytes).map_err(GeoError::from))
            .transpose()
    }

    // Runs `f` against the open journal, or inside a transaction of its own
    // when none is open.
    fn staged<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.journal.is_some() {
            return f(self);
        }
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    // Puts back what a failed commit overwrote, newest write first.
    fn restore(&mut self, undo: Vec<(String, Option<Vec<u8>>)>) {
        for (key, previous) in undo.into_iter().rev() {
            let restored = match previous {
                Some(bytes) => self.cache.set(&key, bytes),
                None => self.cache.delete(&key).map(|_| ()),
            };
            if let Err(e) = restored {
                log::error!("could not restore '{key}' after a failed commit: {e}");
            }
        }
    }

    fn journal(&mut self) -> Result<&mut Journal> {
        self.journal
            .as_mut()
            .ok_or_else(|| GeoError::Transaction("no open transaction".into()))
    }
}

fn catalog_key(namespace: &str) -> String {
    format!("{namespace}.catalog")
}

impl<C: KeyValueCache> StorageProvider for CacheStorage<C> {
    fn begin_transaction(&mut self) -> Result<()> {
        if self.journal.is_some() {
            return Err(GeoError::Transaction("a transaction is already open".into()));
        }
        self.journal = Some(Journal {
            catalog: self.catalog.clone(),
            writes: BTreeMap::new(),
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let journal = self
            .journal
            .take()
            .ok_or_else(|| GeoError::Transaction("commit without an open transaction".into()))?;

        // Records first, then the catalog, then deletions: a reader only
        // follows ids listed in the catalog.
        let (sets, deletes): (Vec<_>, Vec<_>) =
            journal.writes.into_iter().partition(|(_, v)| v.is_some());
        let mut writes: Vec<(String, Vec<u8>, &str)> = sets
            .into_iter()
            .filter_map(|(key, value)| value.map(|bytes| (key, bytes, "writing record")))
            .collect();
        writes.push((
            catalog_key(&self.namespace),
            bincode::serialize(&journal.catalog)?,
            "writing catalog",
        ));

        let mut undo = Vec::with_capacity(writes.len());
        for (key, _, _) in &writes {
            undo.push((key.clone(), self.cache.get(key)?));
        }
        for (written, (key, bytes, what)) in writes.into_iter().enumerate() {
            if let Err(e) = self.cache.set(&key, bytes) {
                undo.truncate(written + 1);
                self.restore(undo);
                return Err(write_failed(what, e));
            }
        }
        self.catalog = journal.catalog;

        for (key, _) in deletes {
            if let Err(e) = self.cache.delete(&key) {
                log::warn!("stale record '{key}' left in cache: {e}");
            }
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if let Some(journal) = self.journal.take() {
            log::debug!("dropping {} staged cache writes", journal.writes.len());
        }
        Ok(())
    }

    fn persist_place(&mut self, place: &Place, entries: &[IndexEntry]) -> Result<()> {
        let id = place
            .id()
            .cloned()
            .ok_or_else(|| GeoError::validation("cannot persist a place without id"))?;
        let record = StoredPlace {
            payload: self.codec.encode(place)?,
            entries: entries.to_vec(),
        };
        let bytes = bincode::serialize(&record)?;
        let key = self.record_key(&id);
        let levels: Vec<i32> = place
            .addresses()
            .values()
            .flat_map(|a| a.admin_levels().iter().map(|l| l.level()))
            .collect();

        self.staged(move |this| {
            let journal = this.journal()?;
            if !journal.catalog.places.contains(&id) {
                journal.catalog.places.push(id);
            }
            journal.catalog.admin_levels.extend(levels);
            journal.writes.insert(key, Some(bytes));
            Ok(())
        })
    }

    fn delete_place_by_id(&mut self, id: &PlaceId) -> Result<bool> {
        let key = self.record_key(id);
        self.staged(|this| {
            let journal = this.journal()?;
            let Some(pos) = journal.catalog.places.iter().position(|p| p == id) else {
                return Ok(false);
            };
            journal.catalog.places.remove(pos);
            journal.writes.insert(key, None);
            Ok(true)
        })
    }

    fn fetch_place_by_id(&self, id: &PlaceId) -> Result<Place> {
        if !self.current_catalog().places.contains(id) {
            return Err(GeoError::not_found(format!("place {id}")));
        }
        let record = self
            .read_record(id)?
            .ok_or_else(|| GeoError::not_found(format!("record of place {id}")))?;
        let place = self.codec.decode(record.payload)?;
        Ok(match place.id() {
            Some(_) => place,
            None => place.with_id(id.clone()),
        })
    }

    fn list_places(&self, offset: usize, limit: usize) -> Result<Vec<Place>> {
        self.current_catalog()
            .places
            .iter()
            .skip(offset)
            .take(limit)
            .map(|id| self.fetch_place_by_id(id))
            .collect()
    }

    fn list_all_known_admin_levels(&self) -> Result<Vec<i32>> {
        Ok(self.current_catalog().admin_levels.iter().copied().collect())
    }

    fn list_all_secondary_index_entries(&self) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for id in &self.current_catalog().places {
            match self.read_record(id)? {
                Some(record) => entries.extend(record.entries),
                None => log::warn!("catalog lists place {id} but its record is missing"),
            }
        }
        Ok(entries)
    }
}

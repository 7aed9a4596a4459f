// crates/geoindex-core/src/traits.rs
use crate::error::Result;
use crate::index::IndexEntry;
use crate::model::{Place, PlaceId};

/// Persistence backend consumed by [`crate::Database`].
///
/// Implementations only provide raw record storage; the secondary index is
/// built and maintained by the database on top of
/// [`list_all_secondary_index_entries`](Self::list_all_secondary_index_entries).
///
/// Writes issued between [`begin_transaction`](Self::begin_transaction) and
/// [`commit`](Self::commit) must become visible together or not at all.
/// Reads inside a transaction see that transaction's own writes.
pub trait StorageProvider: Send {
    fn begin_transaction(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    /// Drops every write since `begin_transaction`. Calling it without an
    /// open transaction is a no-op.
    fn rollback(&mut self) -> Result<()>;

    /// Stores `place` (which carries its id) together with the index rows
    /// that point at it, replacing a previous record with the same id.
    fn persist_place(&mut self, place: &Place, entries: &[IndexEntry]) -> Result<()>;

    /// Removes the record and its index rows. `false` when there was none.
    fn delete_place_by_id(&mut self, id: &PlaceId) -> Result<bool>;

    /// Fails with [`crate::GeoError::NotFound`] for an unknown id.
    fn fetch_place_by_id(&self, id: &PlaceId) -> Result<Place>;

    /// Records in insertion order.
    fn list_places(&self, offset: usize, limit: usize) -> Result<Vec<Place>>;

    fn list_all_known_admin_levels(&self) -> Result<Vec<i32>>;

    fn list_all_secondary_index_entries(&self) -> Result<Vec<IndexEntry>>;
}

/// Byte-oriented cache a [`crate::storage::CacheStorage`] writes into.
///
/// Caches have no secondary query capability; every lookup is by key.
pub trait KeyValueCache: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// `false` when the key was absent.
    fn delete(&mut self, key: &str) -> Result<bool>;
}

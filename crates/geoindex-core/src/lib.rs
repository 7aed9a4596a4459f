// crates/geoindex-core/src/lib.rs
//! Embeddable hierarchical geocoding index.
//!
//! Places are described by one [`Address`] per locale (an admin-level path
//! plus street fields) and a set of [`Polygon`]s. The [`Database`] compiles
//! every address into a canonical key, persists places through a
//! [`StorageProvider`] and keeps a secondary index of those keys; the
//! [`Location`] front end answers forward, reverse and neighbor queries.

pub mod config;
pub mod database;
pub mod error;
pub mod index;
pub mod keys;
#[cfg(feature = "json")]
pub mod loader;
pub mod location;
pub mod model;
pub mod query;
pub mod search;
pub mod spatial;
pub mod storage;
pub mod text;
pub mod traits;
// Serde mirrors of the validated model types
#[doc(hidden)]
pub mod raw;

// Re-exports
pub use crate::config::DBConfig;
pub use crate::database::Database;
pub use crate::error::{GeoError, Result};
pub use crate::index::{IndexEntry, SecondaryIndex};
pub use crate::keys::{KeyCompiler, KeyParts};
pub use crate::location::Location;
pub use crate::model::*;
pub use crate::query::{GeocodeQuery, ReverseQuery};
pub use crate::traits::{KeyValueCache, StorageProvider};

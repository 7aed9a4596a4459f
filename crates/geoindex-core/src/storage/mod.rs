// crates/geoindex-core/src/storage/mod.rs
//! Storage providers.
//!
//! [`CacheStorage`] works on any [`crate::traits::KeyValueCache`];
//! [`MemoryCache`] and [`FileCache`] are provided. With the `relational`
//! feature, [`RelationalStorage`] keeps places in DuckDB tables.

mod cache;
mod codec;
mod kv;
#[cfg(feature = "relational")]
mod relational;

pub use cache::{FileCache, MemoryCache};
pub use codec::{PlaceCodec, PlacePayload};
pub use kv::CacheStorage;
#[cfg(feature = "relational")]
pub use relational::RelationalStorage;

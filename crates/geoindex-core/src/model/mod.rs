// crates/geoindex-core/src/model/mod.rs
//! Entities stored in and returned by the index.

mod address;
mod admin;
mod convert;
mod geometry;
mod paired;
mod place;

pub use address::{Address, Country};
pub use admin::{AdminLevel, AdminLevelCollection};
pub use geometry::{Bounds, Coordinates, Polygon};
pub use paired::{PairedCoordinates, PairedCoordinatesCollection};
pub use place::{Place, PlaceId, DEFAULT_LOCALE};

// crates/geoindex-core/src/raw.rs
//! Serde mirrors of the validated model types.
//!
//! Stored records and fixture documents are decoded into these plain structs
//! first and then converted (see `model::convert`), so a malformed record is
//! rejected with a validation error instead of producing an invalid entity.

use crate::model::{Address, Bounds, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatesRaw {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub alt: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundsRaw {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CountryRaw {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Full place record, keyed the way the JSON export names its fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRaw {
    #[serde(default)]
    pub hash: Option<String>,
    pub address: BTreeMap<String, Address>,
    #[serde(default)]
    pub primary_locale: Option<String>,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub provided_by: String,
}

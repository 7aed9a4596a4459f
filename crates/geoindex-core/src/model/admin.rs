// crates/geoindex-core/src/model/admin.rs
use crate::error::{GeoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tier of an administrative hierarchy. Level 0 is the most general
/// (usually the country), higher numbers are more specific.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLevel {
    level: i32,
    name: String,
}

impl AdminLevel {
    pub fn new(level: i32, name: impl Into<String>) -> Self {
        Self {
            level,
            name: name.into(),
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The full hierarchy path of one address: unique, non-negative levels kept
/// in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AdminLevel>", into = "Vec<AdminLevel>")]
pub struct AdminLevelCollection {
    levels: BTreeMap<i32, AdminLevel>,
}

impl AdminLevelCollection {
    /// Builds a collection, failing on a negative or repeated level.
    pub fn new(levels: impl IntoIterator<Item = AdminLevel>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for admin_level in levels {
            if admin_level.level < 0 {
                return Err(GeoError::validation(format!(
                    "admin level '{}' has a negative level {}",
                    admin_level.name, admin_level.level
                )));
            }
            if map.contains_key(&admin_level.level) {
                return Err(GeoError::validation(format!(
                    "admin collection already has level {}; levels must be unique",
                    admin_level.level
                )));
            }
            map.insert(admin_level.level, admin_level);
        }
        Ok(Self { levels: map })
    }

    /// Shorthand for `(level, name)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (i32, &'a str)>) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(level, name)| AdminLevel::new(level, name)),
        )
    }

    pub fn has(&self, level: i32) -> bool {
        self.levels.contains_key(&level)
    }

    pub fn get(&self, level: i32) -> Option<&AdminLevel> {
        self.levels.get(&level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = &AdminLevel> + '_ {
        self.levels.values()
    }

    /// Highest (most specific) level, or `None` for an empty collection.
    pub fn max_level(&self) -> Option<i32> {
        self.levels.keys().next_back().copied()
    }

    /// True when every level of `other` is present here with the same name.
    pub fn contains_levels(&self, other: &AdminLevelCollection) -> bool {
        other
            .iter()
            .all(|wanted| self.get(wanted.level) == Some(wanted))
    }
}

impl TryFrom<Vec<AdminLevel>> for AdminLevelCollection {
    type Error = GeoError;

    fn try_from(levels: Vec<AdminLevel>) -> Result<Self> {
        Self::new(levels)
    }
}

impl From<AdminLevelCollection> for Vec<AdminLevel> {
    fn from(collection: AdminLevelCollection) -> Self {
        collection.levels.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a AdminLevelCollection {
    type Item = &'a AdminLevel;
    type IntoIter = std::collections::btree_map::Values<'a, i32, AdminLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.values()
    }
}

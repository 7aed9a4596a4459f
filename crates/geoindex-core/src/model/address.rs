// crates/geoindex-core/src/model/address.rs
use super::admin::AdminLevelCollection;
use crate::error::{GeoError, Result};
use crate::raw::CountryRaw;
use serde::{Deserialize, Serialize};

/// Country reference. At least one of name or code is present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CountryRaw", into = "CountryRaw")]
pub struct Country {
    name: Option<String>,
    code: Option<String>,
}

impl Country {
    pub fn new(name: Option<String>, code: Option<String>) -> Result<Self> {
        if name.is_none() && code.is_none() {
            return Err(GeoError::validation(
                "a country must have either a name or a code",
            ));
        }
        Ok(Self { name, code })
    }

    /// Country with both name and code, e.g. `("Ukraine", "UA")`.
    pub fn named(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            code: Some(code.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// One localized description of a place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    locale: String,
    #[serde(default)]
    admin_levels: AdminLevelCollection,
    #[serde(default)]
    street_number: String,
    #[serde(default)]
    street_name: String,
    #[serde(default)]
    locality: String,
    #[serde(default)]
    sub_locality: String,
    #[serde(default)]
    country: Option<Country>,
}

impl Address {
    pub fn new(locale: impl Into<String>, admin_levels: AdminLevelCollection) -> Self {
        Self {
            locale: locale.into(),
            admin_levels,
            street_number: String::new(),
            street_name: String::new(),
            locality: String::new(),
            sub_locality: String::new(),
            country: None,
        }
    }

    pub fn with_admin_levels(mut self, admin_levels: AdminLevelCollection) -> Self {
        self.admin_levels = admin_levels;
        self
    }

    pub fn with_street_number(mut self, street_number: impl Into<String>) -> Self {
        self.street_number = street_number.into();
        self
    }

    pub fn with_street_name(mut self, street_name: impl Into<String>) -> Self {
        self.street_name = street_name.into();
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = locality.into();
        self
    }

    pub fn with_sub_locality(mut self, sub_locality: impl Into<String>) -> Self {
        self.sub_locality = sub_locality.into();
        self
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn admin_levels(&self) -> &AdminLevelCollection {
        &self.admin_levels
    }

    pub fn street_number(&self) -> &str {
        &self.street_number
    }

    pub fn street_name(&self) -> &str {
        &self.street_name
    }

    pub fn locality(&self) -> &str {
        &self.locality
    }

    pub fn sub_locality(&self) -> &str {
        &self.sub_locality
    }

    pub fn country(&self) -> Option<&Country> {
        self.country.as_ref()
    }

    /// Highest admin level of this address; 0 when it has none.
    pub fn max_admin_level(&self) -> i32 {
        self.admin_levels.max_level().unwrap_or(0)
    }
}

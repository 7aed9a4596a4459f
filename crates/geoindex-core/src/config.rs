// crates/geoindex-core/src/config.rs
//! Key-compilation and storage configuration.

use crate::error::{GeoError, Result};
use crate::text::normalize;
use serde::{Deserialize, Serialize};

/// Configuration shared by the key compiler, the index and the storage
/// providers. Read-only once a [`crate::Database`] is opened with it.
///
/// Every field has a default, so a partial TOML or JSON document is enough:
///
/// ```
/// use geoindex_core::DBConfig;
///
/// let config: DBConfig = serde_json::from_str(r#"{"default_locale": "de"}"#).unwrap();
/// assert_eq!(config.default_locale, "de");
/// assert_eq!(config.section_glue, ".");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DBConfig {
    /// Tokens prepended to every key compiled with the prefix flag.
    pub global_prefix: Vec<String>,
    /// Joins key segments.
    pub section_glue: String,
    /// Joins the parts of one admin-level segment.
    pub level_glue: String,
    /// First part of every admin-level segment.
    pub prefix_level: String,
    pub default_locale: String,
    /// Ceiling for any page size a caller asks for.
    pub max_places_in_one_response: usize,
    /// Store places as one compressed blob instead of plain records.
    pub use_compression: bool,
    /// zlib level, 0..=9.
    pub compression_level: u32,
}

impl Default for DBConfig {
    fn default() -> Self {
        Self {
            global_prefix: vec!["geocoder".into(), "storage-provider".into()],
            section_glue: ".".into(),
            level_glue: "-".into(),
            prefix_level: "level".into(),
            default_locale: "en".into(),
            max_places_in_one_response: 100,
            use_compression: false,
            compression_level: 5,
        }
    }
}

// Normalized text is made of ASCII alphanumerics and `%` escapes only; glue
// must stay outside that alphabet.
fn check_glue(name: &str, glue: &str) -> Result<()> {
    if glue.is_empty() {
        return Err(GeoError::Config(format!("{name} must not be empty")));
    }
    if glue.chars().any(|c| c == '%' || c.is_ascii_alphanumeric()) {
        return Err(GeoError::Config(format!(
            "{name} '{glue}' collides with normalized key text"
        )));
    }
    Ok(())
}

impl DBConfig {
    /// Rejects settings the key compiler or the storage layer cannot honor.
    pub fn validate(&self) -> Result<()> {
        check_glue("section_glue", &self.section_glue)?;
        check_glue("level_glue", &self.level_glue)?;
        if self.prefix_level.is_empty() || normalize(&self.prefix_level) != self.prefix_level {
            return Err(GeoError::Config(format!(
                "prefix_level '{}' must be a non-empty normalized token",
                self.prefix_level
            )));
        }
        if self.global_prefix.iter().any(|t| normalize(t).is_empty()) {
            return Err(GeoError::Config(
                "global_prefix must not contain blank tokens".into(),
            ));
        }
        if self.default_locale.trim().is_empty() {
            return Err(GeoError::Config("default_locale must not be empty".into()));
        }
        if self.max_places_in_one_response == 0 {
            return Err(GeoError::Config(
                "max_places_in_one_response must be at least 1".into(),
            ));
        }
        if self.compression_level > 9 {
            return Err(GeoError::Config(format!(
                "compression_level {} is outside of 0..=9",
                self.compression_level
            )));
        }
        if self.use_compression && !cfg!(feature = "compact") {
            return Err(GeoError::Config(
                "use_compression needs the `compact` feature".into(),
            ));
        }
        Ok(())
    }

    /// Validated copy with the global prefix tokens normalized.
    pub fn prepared(mut self) -> Result<Self> {
        self.validate()?;
        self.global_prefix = self.global_prefix.iter().map(|t| normalize(t)).collect();
        Ok(self)
    }

    /// The global prefix as it appears at the start of a compiled key,
    /// e.g. `geocoder.storage%2Dprovider` once [`DBConfig::prepared`].
    pub fn prefix_key(&self) -> String {
        self.global_prefix.join(&self.section_glue)
    }

    /// Page size actually used for a request: `requested` capped at
    /// `max_places_in_one_response`, with 0 meaning "the ceiling".
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        match requested {
            0 => self.max_places_in_one_response,
            n => n.min(self.max_places_in_one_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DBConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.prefix_key(), "geocoder.storage-provider");
        let prepared = config.prepared().unwrap();
        assert_eq!(prepared.prefix_key(), "geocoder.storage%2Dprovider");
    }

    #[test]
    fn rejects_colliding_glue() {
        for glue in ["", "a", "%", "x."] {
            let config = DBConfig {
                section_glue: glue.into(),
                ..DBConfig::default()
            };
            assert!(matches!(config.validate(), Err(GeoError::Config(_))), "{glue:?}");
        }
        let config = DBConfig {
            level_glue: "1".into(),
            ..DBConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_glue_never_appears_in_normalized_text() {
        let config = DBConfig::default();
        for text in ["St. Pauli", "Nordrhein-Westfalen", "a_b~c", "x.-y"] {
            let normalized = normalize(text);
            assert!(!normalized.contains(config.section_glue.as_str()), "{normalized}");
            assert!(!normalized.contains(config.level_glue.as_str()), "{normalized}");
        }
    }

    #[test]
    fn rejects_unusable_limits() {
        let zero = DBConfig {
            max_places_in_one_response: 0,
            ..DBConfig::default()
        };
        assert!(zero.validate().is_err());
        let level = DBConfig {
            compression_level: 10,
            ..DBConfig::default()
        };
        assert!(level.validate().is_err());
        let locale = DBConfig {
            default_locale: " ".into(),
            ..DBConfig::default()
        };
        assert!(locale.validate().is_err());
    }

    #[test]
    fn prepared_normalizes_prefix() {
        let config = DBConfig {
            global_prefix: vec![" My App ".into(), "Store".into()],
            ..DBConfig::default()
        }
        .prepared()
        .unwrap();
        assert_eq!(config.prefix_key(), "my%20app.store");
    }

    #[test]
    fn page_size_is_clamped() {
        let config = DBConfig {
            max_places_in_one_response: 10,
            ..DBConfig::default()
        };
        assert_eq!(config.clamp_page_size(5), 5);
        assert_eq!(config.clamp_page_size(500), 10);
        assert_eq!(config.clamp_page_size(0), 10);
    }
}

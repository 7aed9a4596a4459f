use anyhow::Context;
use geoindex_core::DBConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_STORE_DIR: &str = "geoindex-store";

/// Contents of the `--config` file.
///
/// ```toml
/// store = "/var/lib/geoindex"
///
/// [index]
/// default_locale = "de"
/// use_compression = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub index: DBConfig,
}

impl Settings {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            store = "/tmp/places"
            [index]
            default_locale = "de"
            "#,
        )
        .unwrap();
        assert_eq!(settings.store_dir(), PathBuf::from("/tmp/places"));
        assert_eq!(settings.index.default_locale, "de");
        assert_eq!(settings.index.section_glue, DBConfig::default().section_glue);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.store_dir(), PathBuf::from(DEFAULT_STORE_DIR));
        assert!(settings.db.is_none());
    }
}

// crates/geoindex-core/src/keys.rs
//! Address → canonical key compilation.
//!
//! A key is a glue-joined list of normalized segments:
//!
//! ```text
//! geocoder.storage%2Dprovider.level-0-ukraine.level-2-kyiv.ua.kyiv.pechersk.khreshchatyk.1
//! └────── global prefix ─────┘ └──── admin levels ──────┘ └──── address fields ────────┘
//! ```

use crate::config::DBConfig;
use crate::model::{Address, Place};
use crate::text::normalize;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Which parts a compiled key is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyParts {
    pub levels: bool,
    pub prefix: bool,
    pub address: bool,
}

impl KeyParts {
    /// Every part; the form callers pass to [`crate::Database::get`].
    pub const FULL: KeyParts = KeyParts {
        levels: true,
        prefix: true,
        address: true,
    };

    /// Form stored in the secondary index (no global prefix).
    pub const INDEX: KeyParts = KeyParts {
        levels: true,
        prefix: false,
        address: true,
    };

    /// Prefix and admin levels only; used to list every place below a level.
    pub const LEVELS: KeyParts = KeyParts {
        levels: true,
        prefix: true,
        address: false,
    };
}

/// Compiles addresses into keys and remembers every admin level it has seen.
#[derive(Debug)]
pub struct KeyCompiler {
    config: DBConfig,
    known_levels: RwLock<BTreeSet<i32>>,
}

impl KeyCompiler {
    /// `config` is expected to be [`DBConfig::prepared`] already.
    pub fn new(config: DBConfig) -> Self {
        Self {
            config,
            known_levels: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn config(&self) -> &DBConfig {
        &self.config
    }

    /// Key for one address.
    ///
    /// Compiling the levels registers them as known levels.
    pub fn compile_key(
        &self,
        address: &Address,
        use_levels: bool,
        use_prefix: bool,
        use_address: bool,
    ) -> String {
        let mut segments: Vec<String> = Vec::new();

        if use_prefix {
            segments.extend(self.config.global_prefix.iter().cloned());
        }

        if use_levels {
            let levels = address.admin_levels();
            self.register_levels(levels.iter().map(|l| l.level()));
            let glue = &self.config.level_glue;
            segments.extend(levels.iter().map(|admin| {
                format!(
                    "{}{glue}{}{glue}{}",
                    self.config.prefix_level,
                    admin.level(),
                    normalize(admin.name())
                )
            }));
        }

        if use_address {
            let code = address
                .country()
                .and_then(|c| c.code())
                .unwrap_or_default();
            segments.extend(
                [
                    code,
                    address.locality(),
                    address.sub_locality(),
                    address.street_name(),
                    address.street_number(),
                ]
                .into_iter()
                .map(normalize),
            );
        }

        segments.join(&self.config.section_glue)
    }

    /// [`compile_key`](Self::compile_key) with the parts given as a [`KeyParts`].
    pub fn compile(&self, address: &Address, parts: KeyParts) -> String {
        self.compile_key(address, parts.levels, parts.prefix, parts.address)
    }

    /// One key per locale of `place`.
    pub fn compile_keys(
        &self,
        place: &Place,
        use_levels: bool,
        use_prefix: bool,
        use_address: bool,
    ) -> BTreeMap<String, String> {
        place
            .addresses()
            .iter()
            .map(|(locale, address)| {
                (
                    locale.clone(),
                    self.compile_key(address, use_levels, use_prefix, use_address),
                )
            })
            .collect()
    }

    pub(crate) fn register_levels(&self, levels: impl IntoIterator<Item = i32>) {
        let levels: Vec<i32> = levels.into_iter().collect();
        if levels.iter().all(|l| self.known_levels.read().contains(l)) {
            return;
        }
        let mut known = self.known_levels.write();
        for level in levels {
            if known.insert(level) {
                log::debug!("new admin level {level}");
            }
        }
    }

    /// Every admin level seen so far, ascending.
    pub fn known_levels(&self) -> Vec<i32> {
        self.known_levels.read().iter().copied().collect()
    }
}

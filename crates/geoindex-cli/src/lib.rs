//! geoindex-cli
//! ============
//!
//! Command-line interface for the `geoindex-core` place index.
//!
//! This crate primarily provides a binary (`geoindex-cli`). The library
//! target only carries this overview for the rendered docs.
//!
//! Quick start
//! -----------
//!
//! ```text
//! geoindex-cli --help
//! geoindex-cli load crates/geoindex-core/tests/fixtures
//! geoindex-cli geocode "belsenplatz"
//! geoindex-cli reverse --lat 51.2314767 --lon 6.7473107
//! geoindex-cli -l de levels
//! ```
//!
//! For programmatic access use the [`geoindex-core`] crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]

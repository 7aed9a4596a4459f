//! geoindex-cli - Command-line interface for geoindex-core
//!
//! Keeps a place store on disk and answers forward, reverse and neighbor
//! queries against it.
//!
//! Usage examples
//! --------------
//!
//! - Import fixtures (a single document or a whole directory)
//!   $ geoindex-cli load tests/fixtures
//!
//! - Forward lookup, optionally in another locale
//!   $ geoindex-cli geocode "dusseldorf belsenplatz"
//!   $ geoindex-cli -l de geocode düsseldorf
//!
//! - Reverse lookup
//!   $ geoindex-cli reverse --lat 51.2314767 --lon 6.7473107
//!
//! - Neighbors of a stored place, children of an admin path
//!   $ geoindex-cli touching <id> --max-km 0.2
//!   $ geoindex-cli children 0=Germany 2=Dusseldorf
//!
//! Storage
//! -------
//!
//! By default the store lives in `./geoindex-store` (one file per record).
//! Use `--store <dir>` to point elsewhere, or `--db <file>` for a DuckDB
//! store when built with the `relational` feature. Settings can also come
//! from a TOML file given with `--config`; command-line flags win.
//!
//! Set `RUST_LOG=debug` for a trace of index and storage activity.
mod args;
mod output;
mod settings;

use crate::args::{CliArgs, Commands};
use crate::settings::Settings;
use anyhow::{bail, Context};
use clap::Parser;
use geoindex_core::storage::{CacheStorage, FileCache};
use geoindex_core::{
    AdminLevelCollection, Coordinates, GeoError, Location, PlaceId, StorageProvider,
};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = CliArgs::parse();

    let settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    let locale = args
        .locale
        .clone()
        .unwrap_or_else(|| settings.index.default_locale.clone());

    #[cfg(feature = "relational")]
    if let Some(db) = args.db.as_ref().or(settings.db.as_ref()) {
        use geoindex_core::storage::RelationalStorage;
        let storage = RelationalStorage::open_path(db, &settings.index)
            .with_context(|| format!("opening DuckDB store {}", db.display()))?;
        let location = Location::open(storage, settings.index)?;
        return run(&location, args.command, &locale);
    }

    let dir = args.store.clone().unwrap_or_else(|| settings.store_dir());
    let cache =
        FileCache::open(&dir).with_context(|| format!("opening store {}", dir.display()))?;
    let storage = CacheStorage::open(cache, &settings.index)?;
    let location = Location::open(storage, settings.index)?;
    run(&location, args.command, &locale)
}

fn run<S: StorageProvider>(
    location: &Location<S>,
    command: Commands,
    locale: &str,
) -> anyhow::Result<()> {
    match command {
        #[cfg(feature = "json")]
        Commands::Load { path } => {
            let places = if path.is_dir() {
                geoindex_core::loader::load_places_from_dir(&path)?
            } else {
                vec![geoindex_core::loader::load_place(&path)?]
            };
            let total = places.len();
            for mut place in places {
                location.add_place(&mut place)?;
                println!("{}", output::summary(&place, locale));
            }
            println!("Loaded {total} places from {}", path.display());
        }

        Commands::Geocode { text, limit } => {
            let places = location.geocode(&text, limit, locale)?;
            if places.is_empty() {
                println!("No places found matching: {text}");
            }
            for place in &places {
                println!("{}", output::summary(place, locale));
            }
        }

        Commands::Reverse { lat, lon } => {
            let point = Coordinates::new(lon, lat)?;
            match location.reverse(&point, locale)? {
                Some(place) => print!("{}", output::details(&place, locale)),
                None => println!("No place contains {lat}, {lon}"),
            }
        }

        Commands::Touching { id, max_km } => {
            let original = location.get_place(&PlaceId::new(id))?;
            let pairs = location.find_touched_places(&original, max_km, &[])?;
            if pairs.is_empty() {
                println!("Nothing within {max_km} km");
            }
            for pair in &pairs {
                println!("{}", output::pair(pair, locale));
            }
        }

        Commands::Children { levels } => {
            let levels =
                AdminLevelCollection::from_pairs(levels.iter().map(|(l, n)| (*l, n.as_str())))?;
            for place in location.find_child_places(&levels, locale)? {
                println!("{}", output::summary(&place, locale));
            }
        }

        Commands::Places { offset, limit } => {
            for place in location.get_all_places(offset, limit)? {
                println!("{}", output::summary(&place, locale));
            }
        }

        Commands::Show { id } => match location.get_place(&PlaceId::new(id.as_str())) {
            Ok(place) => print!("{}", output::details(&place, locale)),
            Err(GeoError::NotFound(_)) => bail!("No place stored under {id}"),
            Err(e) => return Err(e.into()),
        },

        Commands::Delete { id } => {
            let place = location
                .get_place(&PlaceId::new(id.as_str()))
                .with_context(|| format!("looking up {id}"))?;
            location.delete_place(&place)?;
            println!("Deleted {id}");
        }

        Commands::Levels => {
            let levels = location.get_admin_levels();
            if levels.is_empty() {
                println!("The store is empty");
            }
            for level in levels {
                println!("{level}");
            }
        }
    }
    Ok(())
}

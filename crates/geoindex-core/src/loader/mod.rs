// crates/geoindex-core/src/loader/mod.rs

//! # Fixture Loader
//!
//! Reads place documents from disk. This module owns the transport
//! (files, directories, gzip); [`fixture`] owns the document format.

use crate::error::{GeoError, Result};
use crate::model::Place;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

mod fixture;

pub use fixture::parse_place;

/// Opens `path` for reading, gunzipping files that end in `.gz`.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        GeoError::NotFound(format!("Fixture not found at {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    if is_gzip(path) {
        #[cfg(feature = "compact")]
        {
            use flate2::read::GzDecoder;
            return Ok(Box::new(GzDecoder::new(reader)));
        }
        #[cfg(not(feature = "compact"))]
        {
            return Err(GeoError::Config(format!(
                "{} is gzipped but the 'compact' feature is disabled",
                path.display()
            )));
        }
    }
    Ok(Box::new(reader))
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn is_fixture(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.ends_with(".json") || name.ends_with(".json.gz")
}

/// Reads a single place document.
pub fn load_place(path: impl AsRef<Path>) -> Result<Place> {
    let path = path.as_ref();
    let place = parse_place(open_stream(path)?)
        .map_err(|e| match e {
            GeoError::Validation(msg) => {
                GeoError::Validation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
    log::debug!("loaded {} ({} polygons)", path.display(), place.polygons().len());
    Ok(place)
}

/// Reads every `.json` / `.json.gz` document in `dir`, ordered by file name.
/// Subdirectories and other files are ignored.
pub fn load_places_from_dir(dir: impl AsRef<Path>) -> Result<Vec<Place>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| {
            GeoError::NotFound(format!("Fixture directory not found at {}: {}", dir.display(), e))
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_fixture(p))
        .collect();
    paths.sort();

    let places = paths.iter().map(load_place).collect::<Result<Vec<_>>>()?;
    log::info!("loaded {} places from {}", places.len(), dir.display());
    Ok(places)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "geocoding": {"attribution": "fixture"},
        "features": [{
            "geometry": {"coordinates": [[[50.0, 30.0], [50.0, 31.0], [51.0, 31.0]]]},
            "properties": {
                "common": {},
                "en": {"geocoding": {"admin": {"level0": "Ukraine"}, "country": "Ukraine"}}
            }
        }]
    }"#;

    #[test]
    fn loads_plain_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json"] {
            fs::write(dir.path().join(name), DOC).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let places = load_places_from_dir(dir.path()).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].provided_by(), "fixture");
    }

    #[cfg(feature = "compact")]
    #[test]
    fn loads_gzipped_files() {
        use flate2::{write::GzEncoder, Compression};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kyiv.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(DOC.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let place = load_place(&path).unwrap();
        assert_eq!(place.primary_address().max_admin_level(), 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_place("/definitely/not/here.json").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn validation_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(DOC.replace("level0", "region").as_bytes()).unwrap();

        match load_place(&path) {
            Err(GeoError::Validation(msg)) => assert!(msg.contains("broken.json")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}

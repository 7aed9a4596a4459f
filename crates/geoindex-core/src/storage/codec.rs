// crates/geoindex-core/src/storage/codec.rs
//! Binary encoding of stored places.

use crate::config::DBConfig;
use crate::error::{GeoError, Result};
use crate::model::Place;
use serde::{Deserialize, Serialize};

/// A place as written to a backend: either the plain record or a
/// zlib-compressed bincode blob of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PlacePayload {
    Plain(Place),
    Compressed(Vec<u8>),
}

/// Encodes places according to the compression settings of a [`DBConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceCodec {
    compress: bool,
    #[cfg_attr(not(feature = "compact"), allow(dead_code))]
    level: u32,
}

impl PlaceCodec {
    pub fn from_config(config: &DBConfig) -> Self {
        Self {
            compress: config.use_compression,
            level: config.compression_level,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    pub fn encode(&self, place: &Place) -> Result<PlacePayload> {
        if self.compress {
            Ok(PlacePayload::Compressed(self.compress_place(place)?))
        } else {
            Ok(PlacePayload::Plain(place.clone()))
        }
    }

    /// Payloads written in either mode can be read back in either mode.
    pub fn decode(&self, payload: PlacePayload) -> Result<Place> {
        match payload {
            PlacePayload::Plain(place) => Ok(place),
            PlacePayload::Compressed(bytes) => self.decompress_place(&bytes),
        }
    }

    #[cfg(feature = "compact")]
    pub fn compress_place(&self, place: &Place) -> Result<Vec<u8>> {
        use flate2::{write::ZlibEncoder, Compression};

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        bincode::serialize_into(&mut encoder, place)?;
        Ok(encoder.finish()?)
    }

    #[cfg(feature = "compact")]
    pub fn decompress_place(&self, bytes: &[u8]) -> Result<Place> {
        let decoder = flate2::read::ZlibDecoder::new(bytes);
        Ok(bincode::deserialize_from(decoder)?)
    }

    #[cfg(not(feature = "compact"))]
    pub fn compress_place(&self, _place: &Place) -> Result<Vec<u8>> {
        Err(GeoError::Config(
            "compressed storage needs the `compact` feature".into(),
        ))
    }

    #[cfg(not(feature = "compact"))]
    pub fn decompress_place(&self, _bytes: &[u8]) -> Result<Place> {
        Err(GeoError::Config(
            "compressed records need the `compact` feature".into(),
        ))
    }
}

/// Wraps a failure that happened while a backend was mid-write.
pub(crate) fn write_failed(what: &str, err: GeoError) -> GeoError {
    match err {
        GeoError::Transaction(_) => err,
        other => GeoError::Transaction(format!("{what}: {other}")),
    }
}

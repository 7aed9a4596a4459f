// crates/geoindex-core/src/storage/cache.rs
//! [`KeyValueCache`] implementations.

use crate::error::Result;
use crate::traits::KeyValueCache;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Process-local cache on an ordered map.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// One file per key inside a directory.
///
/// Keys are hex-encoded into file names, so any key is a valid name and two
/// keys never map to the same file. Writes go to a temporary file first and
/// are renamed into place.
#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Opens `dir`, creating it when missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key.bytes().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{name}.bin"))
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(cache: &mut dyn KeyValueCache) {
        assert_eq!(cache.get("a").unwrap(), None);
        cache.set("a", vec![1, 2]).unwrap();
        cache.set("a/b c", vec![3]).unwrap();
        assert_eq!(cache.get("a").unwrap(), Some(vec![1, 2]));
        assert_eq!(cache.get("a/b c").unwrap(), Some(vec![3]));
        cache.set("a", vec![9]).unwrap();
        assert_eq!(cache.get("a").unwrap(), Some(vec![9]));
        assert!(cache.delete("a").unwrap());
        assert!(!cache.delete("a").unwrap());
        assert_eq!(cache.get("a").unwrap(), None);
    }

    #[test]
    fn memory_cache_behaves_like_a_map() {
        let mut cache = MemoryCache::new();
        exercise(&mut cache);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::open(dir.path().join("store")).unwrap();
        exercise(&mut cache);

        let reopened = FileCache::open(cache.dir()).unwrap();
        assert_eq!(reopened.get("a/b c").unwrap(), Some(vec![3]));
    }
}

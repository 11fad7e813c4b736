use super::{validate_key, KeyValueStore, StoreError};
use log::trace;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One file per key under `data_dir`, named `<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        trace!(target: "store", "Writing {} bytes to {:?}", value.len(), path);
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("funGamesHub_stats").unwrap(), None);

        store.set("funGamesHub_stats", "{}").unwrap();
        assert!(dir.path().join("nested/funGamesHub_stats.json").exists());

        let reopened = FileStore::new(dir.path().join("nested")).unwrap();
        assert_eq!(
            reopened.get("funGamesHub_stats").unwrap().as_deref(),
            Some("{}")
        );

        reopened.remove("funGamesHub_stats").unwrap();
        reopened.remove("funGamesHub_stats").unwrap();
        assert_eq!(reopened.get("funGamesHub_stats").unwrap(), None);
    }
}

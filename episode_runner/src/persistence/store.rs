//! Key/value stores backing the persistence gateway.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use super::PersistenceError;

/// A string key/value store. Each write fully replaces the previous value.
pub trait SaveStore {
    fn put(&mut self, key: &str, value: String) -> Result<(), PersistenceError>;

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn put(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files under `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SaveStore for FileStore {
    fn put(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            key: key.to_owned(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Written beside the slot and renamed over it, so readers only ever
        // see the old record or the new one.
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        staged.write_all(value.as_bytes()).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged
            .persist(self.path_for(key))
            .map_err(|err| io_err(err.error))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

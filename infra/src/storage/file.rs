//! JSON file storage
//!
//! The whole key space is one JSON object, read on every access and rewritten
//! through a sibling temp file on every change. Suitable for a single host
//! process; concurrent processes are last-writer-wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use cg_core::errors::StorageError;
use cg_core::services::DurableStorage;

use crate::InfrastructureError;

type Entries = BTreeMap<String, String>;

/// Storage backed by a JSON object file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Prepare storage at `path`, creating its parent directory
    ///
    /// The file itself is only created by the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InfrastructureError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if path.is_dir() {
            return Err(InfrastructureError::Config(format!(
                "Session file path {} is a directory",
                path.display()
            )));
        }
        debug!(path = %path.display(), event = "file_storage_opened", "Using session file");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, InfrastructureError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), InfrastructureError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries) -> bool) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        if apply(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

//! JSON file backend for desktop hosts.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "dash:layout:order:v1": "[\"dashboard-kpis\",\"dashboard-focus\"]",
//!     "dash:layoutMode:v1": "1"
//!   }
//! }
//! ```
//!
//! # Atomic Writes
//!
//! Every mutation rewrites the whole file through a temp file followed by a
//! rename, so a crash mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::{KeyValueStore, StoreError};

/// Current file format version.
pub const FILE_FORMAT_VERSION: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u64,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Key-value store persisted to one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// - **Missing file** yields an empty store; the file is created on the
    ///   first write.
    /// - **Corrupt file** or **version mismatch** is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let contents = std::fs::read_to_string(&path)?;
        let file: StoreFile =
            serde_json::from_str(&contents).map_err(|err| StoreError::Corrupt {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        if file.version != FILE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: file.version,
                expected: FILE_FORMAT_VERSION,
            });
        }
        tracing::debug!(path = %path.display(), entries = file.entries.len(), "opened layout store file");
        Ok(Self {
            path,
            entries: file.entries,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    fn flush(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            version: FILE_FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_owned(), value.to_owned());
        if let Err(err) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_owned(), previous),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = self.flush() {
            self.entries.insert(key.to_owned(), previous);
            return Err(err);
        }
        Ok(true)
    }
}

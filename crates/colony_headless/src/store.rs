//! File-backed blob store for saves and settings.
//!
//! Mirrors the browser local-storage shape the core's save contract was
//! written for: a flat string-to-string map, persisted here as one JSON
//! file. Writes go through to disk immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use colony_core::prelude::{GameError, Result, SaveStore};

/// A [`SaveStore`] persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`.
    ///
    /// A missing file starts empty; an unreadable one is logged and
    /// discarded rather than failing the run.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding unreadable store file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(GameError::Save(e.to_string())),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| GameError::Save(e.to_string()))?;
        std::fs::write(&self.path, blob).map_err(|e| GameError::Save(e.to_string()))
    }
}

impl SaveStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        self.persist()
    }
}

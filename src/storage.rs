//! Storage adapters for the task document
//!
//! The whole document lives in memory. [`Database::update`] is the only way to
//! change it: the mutator runs and the full document is persisted before the
//! call returns. A failed persist leaves the in-memory document untouched.
//!
//! ```text
//! ~/tasks.json          # the document (pretty JSON, rewritten on every update)
//! ~/tasks.json.lock     # advisory lock held while rewriting
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Whole-document store with a single mutation entry point
pub trait Database<T> {
    /// Current in-memory document
    fn data(&self) -> &T;

    /// Apply `mutator` to the document and persist all of it. On error the
    /// document is left as it was.
    fn update<F>(&mut self, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut T);
}

/// JSON file backed database
///
/// The file is read once in [`JsonFileDatabase::open`]. A missing or empty file
/// yields the default document; the file itself is created by the first update.
#[derive(Debug)]
pub struct JsonFileDatabase<T> {
    path: PathBuf,
    data: T,
}

impl<T> JsonFileDatabase<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load `path`, falling back to `default_data` when there is nothing on disk
    pub fn open(path: impl Into<PathBuf>, default_data: T) -> Result<Self> {
        let path = path.into();
        let data = match read_document(&path)? {
            Some(data) => {
                debug!(path = %path.display(), "loaded task file");
                data
            }
            None => {
                debug!(path = %path.display(), "no task file yet, using default document");
                default_data
            }
        };

        Ok(Self { path, data })
    }

    fn persist(&self, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic_locked(&self.path, json.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)?;
        debug!(path = %self.path.display(), bytes = json.len(), "persisted task file");
        Ok(())
    }
}

impl<T> Database<T> for JsonFileDatabase<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn data(&self) -> &T {
        &self.data
    }

    /// The mutation is applied to a copy; memory only changes once the copy
    /// is on disk.
    fn update<F>(&mut self, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.data.clone();
        mutator(&mut next);
        self.persist(&next)?;
        self.data = next;
        Ok(())
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&content)?))
}

/// In-memory database that counts persists
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase<T> {
    data: T,
    writes: usize,
}

impl<T> MemoryDatabase<T> {
    pub fn new(data: T) -> Self {
        Self { data, writes: 0 }
    }

    /// Number of `update` calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl<T> Database<T> for MemoryDatabase<T> {
    fn data(&self) -> &T {
        &self.data
    }

    fn update<F>(&mut self, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        mutator(&mut self.data);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<String>,
    }

    #[test]
    fn test_missing_file_uses_default_without_creating() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        let default = Doc {
            items: vec!["seed".to_string()],
        };
        let db = JsonFileDatabase::open(&path, default.clone()).unwrap();

        assert_eq!(db.data(), &default);
        assert!(!path.exists());
    }

    #[test]
    fn test_update_persists_whole_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("tasks.json");

        let mut db = JsonFileDatabase::open(&path, Doc::default()).unwrap();
        db.update(|doc| doc.items.push("first".to_string())).unwrap();
        db.update(|doc| doc.items.push("second".to_string())).unwrap();

        let reopened = JsonFileDatabase::open(&path, Doc::default()).unwrap();
        assert_eq!(reopened.data().items, vec!["first", "second"]);
        assert!(lock::lock_path_for(&path).exists());
    }

    #[test]
    fn test_empty_file_treated_as_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, "  \n").unwrap();

        let db = JsonFileDatabase::open(&path, Doc::default()).unwrap();
        assert!(db.data().items.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();

        let result = JsonFileDatabase::open(&path, Doc::default());
        assert!(matches!(result, Err(Error::Json(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_failed_persist_leaves_document_unchanged() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("tasks.json");

        let default = Doc {
            items: vec!["seed".to_string()],
        };
        let mut db = JsonFileDatabase::open(&path, default.clone()).unwrap();

        let result = db.update(|doc| doc.items.push("lost".to_string()));
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(db.data(), &default);
    }

    #[test]
    fn test_memory_database_counts_writes() {
        let mut db = MemoryDatabase::new(Doc::default());
        assert_eq!(db.writes(), 0);

        db.update(|doc| doc.items.push("a".to_string())).unwrap();
        db.update(|_| {}).unwrap();

        assert_eq!(db.writes(), 2);
        assert_eq!(db.data().items, vec!["a"]);
    }
}

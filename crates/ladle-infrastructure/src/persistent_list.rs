//! An ordered in-memory list mirrored 1:1 to a JSON array file.
//!
//! Every mutation rewrites the whole file from the in-memory state; writes
//! go through a temporary file plus atomic rename so a crash mid-write never
//! leaves a half-written database. No locking happens here - callers
//! serialize access externally.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use ladle_core::{LadleError, Result};

/// A file-backed ordered collection of records.
pub struct PersistentList<T> {
    path: PathBuf,
    items: Vec<T>,
}

impl<T> PersistentList<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the list at `path`, loading any records already on disk.
    ///
    /// A missing file yields an empty list. An unreadable or unparseable
    /// file is logged and also yields an empty list - a corrupt database
    /// must never take the process down.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = Self::load_items(&path);
        Self { path, items }
    }

    fn load_items(path: &Path) -> Vec<T> {
        if !path.exists() {
            return Vec::new();
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read database file");
                return Vec::new();
            }
        };
        if content.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to parse database file");
                Vec::new()
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the records. Callers must [`save`](Self::save)
    /// afterwards to keep the file in sync.
    pub fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a record and rewrites the file.
    pub fn add(&mut self, item: T) -> Result<()> {
        self.items.push(item);
        self.save()
    }

    /// Removes every record matching the predicate and rewrites the file.
    /// Returns true if anything was removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        if self.items.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Serializes the entire list and atomically replaces the backing file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.items)?;

        // Write to a temporary file in the same directory, then rename over
        // the real file so readers never observe a partial write.
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| LadleError::io("database path has no file name"))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

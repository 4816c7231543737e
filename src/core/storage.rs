//! Key/value string storage backing the settings and identity records.
//!
//! [`FileStore`] keeps every key in one JSON object on disk and replaces the
//! file atomically on each write, so a reader sees either the previous map or
//! the new one. [`MemoryStore`] is the same contract without a disk.

use crate::core::config::data::path_display;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors raised while reading or writing the local store.
#[derive(Debug)]
pub enum StorageError {
    /// The backing file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Writing or replacing the backing file failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read { path, source } => {
                write!(f, "Failed to read storage at {}: {}", path_display(path), source)
            }
            StorageError::Parse { path, source } => {
                write!(f, "Failed to parse storage at {}: {}", path_display(path), source)
            }
            StorageError::Write { path, source } => {
                write!(f, "Failed to write storage at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Read { source, .. } => Some(source),
            StorageError::Parse { source, .. } => Some(source),
            StorageError::Write { source, .. } => Some(source),
        }
    }
}

/// Browser-style local storage: string values under string keys.
pub trait LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "local_storage.json";

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store inside `dir`, or the platform data directory when `dir` is `None`.
    pub fn in_dir(dir: Option<&Path>) -> Result<Self, Box<dyn StdError>> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("org", "guardian", "guardian")
                .ok_or("Failed to determine data directory")?
                .data_dir()
                .to_path_buf(),
        };
        Ok(Self::new(dir.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(map)
            .map_err(std::io::Error::from)
            .and_then(|contents| replace_file(&self.path, contents.as_bytes()));
        contents.map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Writes `contents` to a temp file beside `path` and renames it into place,
/// creating missing parent directories.
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    temp_file.write_all(contents)?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt map is replaced rather than blocking every future save.
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Parse { .. }) => BTreeMap::new(),
            Err(err) => return Err(err),
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

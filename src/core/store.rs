//! File access for the engine.
//!
//! The engine never touches the file system directly; reads and writes go
//! through a [`FileStore`] so sessions can run against memory in tests.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::NlsError;

pub trait FileStore {
    /// Contents of `path`, or `None` if it does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>, NlsError>;

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), NlsError>;

    fn delete(&mut self, path: &Path) -> Result<(), NlsError>;

    fn exists(&self, path: &Path) -> bool;
}

/// The real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&self, path: &Path) -> Result<Option<String>, NlsError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(NlsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), NlsError> {
        let to_error = |source| NlsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
        fs::write(path, contents).map_err(to_error)
    }

    fn delete(&mut self, path: &Path) -> Result<(), NlsError> {
        fs::remove_file(path).map_err(|source| NlsError::Delete {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Files held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.insert(path.into(), contents.to_string());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Option<String>, NlsError> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<(), NlsError> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn delete(&mut self, path: &Path) -> Result<(), NlsError> {
        match self.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(NlsError::Delete {
                path: path.to_path_buf(),
                source: ErrorKind::NotFound.into(),
            }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

//! Key-value storage for the persisted editor document

use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::editor::Editor;
use crate::envelope::EnvelopeError;

/// Key the editor document is stored under.
pub const DEFAULT_KEY: &str = "@pixel-canvas/editor";

/// Error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// String key-value store.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Returns whether the key existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name.trim_start_matches('.')))
    }

    fn io_error(path: &Path, source: io::Error) -> StorageError {
        StorageError::Io { path: path.to_path_buf(), source }
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.path_for(key);
        // Write then rename so a crash never leaves a half-written document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        debug!("stored {} bytes at {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}

/// In-process store, used by tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }
}

/// Load the editor stored under `key`.
///
/// A missing, unreadable or invalid document yields an empty editor.
pub fn restore_editor(store: &dyn Store, key: &str) -> Editor {
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return Editor::empty(),
        Err(e) => {
            warn!("could not read saved editor: {}", e);
            return Editor::empty();
        }
    };
    match Editor::try_restore(&json) {
        Ok(editor) => editor,
        Err(e) => {
            warn!("discarding saved editor: {}", e);
            Editor::empty()
        }
    }
}

/// Store the editor under `key`.
pub fn save_editor(store: &dyn Store, key: &str, editor: &Editor) -> Result<(), StorageError> {
    let json = editor.save()?;
    store.set(key, &json)
}

//! Durable key/value storage for the session.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors from reading or writing persisted session data.
#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A flat string map persisted somewhere durable.
///
/// `read` on storage that was never written returns an empty map.
pub trait SessionStorage: Send + Sync + 'static {
    /// Load every stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage exists but cannot be read or decoded.
    fn read(&self) -> Result<BTreeMap<String, String>, SessionStorageError>;

    /// Replace the stored entries with `entries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be written.
    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionStorageError>;
}

// =============================================================================
// File storage
// =============================================================================

/// JSON object in a file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileSessionStorage {
    fn read(&self) -> Result<BTreeMap<String, String>, SessionStorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        {
            let mut file = open_private(&temp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Create (truncating) a file readable only by the owner.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// =============================================================================
// Memory storage
// =============================================================================

/// Process-local storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    /// Copy of the current entries.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn read(&self) -> Result<BTreeMap<String, String>, SessionStorageError> {
        Ok(self.entries())
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionStorageError> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = entries.clone();
        Ok(())
    }
}

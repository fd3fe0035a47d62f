use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ChatStoreError;
use crate::paths::key_file_name;

/// String-keyed record storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError>;

    fn remove(&self, key: &str) -> Result<(), ChatStoreError>;
}

/// One file per key inside a data directory.
///
/// Writes go through a sibling temp file and a rename so a crash never leaves
/// a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Uses `root` as the data directory. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, ChatStoreError> {
        key_file_name(key)
            .map(|file_name| self.root.join(file_name))
            .ok_or_else(|| ChatStoreError::InvalidKey {
                key: key.to_string(),
            })
    }
}

impl KeyValueStore for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ChatStoreError::io("reading record", &path, source)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.root)
            .map_err(|source| ChatStoreError::io("creating data directory", &self.root, source))?;

        let temp_path = path.with_extension("record.tmp");
        fs::write(&temp_path, value)
            .map_err(|source| ChatStoreError::io("writing record", &temp_path, source))?;
        fs::rename(&temp_path, &path)
            .map_err(|source| ChatStoreError::io("replacing record", &path, source))
    }

    fn remove(&self, key: &str) -> Result<(), ChatStoreError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ChatStoreError::io("removing record", &path, source)),
        }
    }
}

/// Process-local storage. Clones share the same records.
///
/// Reads and writes can be made to fail on demand to exercise best-effort
/// persistence paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of the raw record, bypassing failure injection.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock_records().get(key).cloned()
    }

    fn lock_records(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, ChatStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ChatStoreError::Unavailable {
                operation: "reading",
                key: key.to_string(),
            });
        }
        Ok(self.lock_records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChatStoreError::Unavailable {
                operation: "writing",
                key: key.to_string(),
            });
        }
        self.lock_records()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChatStoreError::Unavailable {
                operation: "removing",
                key: key.to_string(),
            });
        }
        self.lock_records().remove(key);
        Ok(())
    }
}

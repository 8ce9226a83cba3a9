//! Persistent translation cache.
//!
//! Maps `(normalized source text, language)` to a translated string. The table
//! is loaded once from a [`CacheStore`] when the cache is created and the whole
//! table is written back to the store on every `put` (write-through). Entries
//! are never evicted; only [`PersistentCache::clear`] removes them, together
//! with the durable copy.
//!
//! # Storage format
//!
//! A single JSON object of objects:
//!
//! ```json
//! { "save": { "ar": "حفظ" }, "cancel": { "ar": "إلغاء" } }
//! ```

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the durable slot holding the serialized table.
pub const CACHE_SLOT_NAME: &str = "translation_cache";

/// Errors raised by a [`CacheStore`].
///
/// These never leave the cache: a failed load yields an empty cache and a
/// failed write or removal is logged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("cache payload could not be encoded or decoded: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Cache key derived from source text.
///
/// Surrounding whitespace is trimmed and the text is lowercased, so
/// `"Save"` and `"  save "` share one entry. Defined for every string,
/// including the empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(text: &str) -> Self {
        NormalizedKey(text.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NormalizedKey {
    fn from(text: &str) -> Self {
        NormalizedKey::new(text)
    }
}

/// Serialized shape: normalized text -> language code -> translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct CacheTable(BTreeMap<String, BTreeMap<String, String>>);

/// Durable single-slot byte store behind the cache.
///
/// Reads and writes are synchronous. `read` returns `Ok(None)` when the slot
/// has never been written or was removed.
pub trait CacheStore: Send + Sync {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&self, bytes: &[u8]) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
}

/// File-backed store: one JSON file named after [`CACHE_SLOT_NAME`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store the slot inside `dir` (created on first write).
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", CACHE_SLOT_NAME)),
        }
    }

    /// Default location under the platform cache directory.
    ///
    /// Falls back to the system temp directory when no cache directory is known.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("smart-translate")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Clones share the same slot, which lets a test hand one
/// clone to a cache and inspect the payload through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw payload.
    pub fn with_payload(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(bytes.into()))),
        }
    }

    /// Current raw payload, if the slot is populated.
    pub fn payload(&self) -> Option<Vec<u8>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.payload())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Write-through translation cache.
pub struct PersistentCache {
    table: CacheTable,
    store: Box<dyn CacheStore>,
}

impl PersistentCache {
    /// Load the cache from `store`.
    ///
    /// A missing, unreadable or corrupt payload yields an empty cache.
    pub fn load(store: impl CacheStore + 'static) -> Self {
        let table = match store.read() {
            Ok(Some(bytes)) => match serde_json::from_slice::<CacheTable>(&bytes) {
                Ok(table) => {
                    info!("Loaded translation cache with {} entries", table.0.len());
                    table
                }
                Err(e) => {
                    warn!("Translation cache payload is corrupt, starting empty: {}", e);
                    CacheTable::default()
                }
            },
            Ok(None) => {
                debug!("No stored translation cache, starting empty");
                CacheTable::default()
            }
            Err(e) => {
                warn!("Failed to read translation cache, starting empty: {}", e);
                CacheTable::default()
            }
        };

        Self {
            table,
            store: Box::new(store),
        }
    }

    /// Cached translation of `text` into `language`.
    pub fn get(&self, text: &str, language: Language) -> Option<&str> {
        let key = NormalizedKey::new(text);
        self.table
            .0
            .get(key.as_str())
            .and_then(|by_lang| by_lang.get(language.code()))
            .map(String::as_str)
    }

    /// Store a translation and persist the whole table.
    ///
    /// Translations into the canonical language are ignored.
    pub fn put(&mut self, text: &str, language: Language, value: impl Into<String>) {
        if language.is_canonical() {
            debug!("Ignoring cache write for canonical language '{}'", language);
            return;
        }

        let key = NormalizedKey::new(text);
        self.table
            .0
            .entry(key.0)
            .or_default()
            .insert(language.code().to_string(), value.into());

        self.flush();
    }

    /// Drop every entry and delete the durable payload.
    pub fn clear(&mut self) {
        self.table.0.clear();
        match self.store.remove() {
            Ok(()) => info!("Translation cache cleared"),
            Err(e) => warn!("Failed to remove stored translation cache: {}", e),
        }
    }

    /// Number of cached (text, language) pairs.
    pub fn len(&self) -> usize {
        self.table.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flush(&self) {
        let result = serde_json::to_vec(&self.table)
            .map_err(StorageError::from)
            .and_then(|bytes| self.store.write(&bytes));

        if let Err(e) = result {
            warn!("Failed to persist translation cache: {}", e);
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// 主題狀態的儲存鍵。 / Storage key holding the persisted theme selection.
pub const THEME_STORAGE_KEY: &str = "theme-storage";
/// 語系狀態的儲存鍵。 / Storage key holding the persisted language code.
pub const LANGUAGE_STORAGE_KEY: &str = "language-storage";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage entry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write storage entry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse storage entry '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize storage entry '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 儲存後端。 / Pluggable key/value backend holding one JSON document per store.
///
/// Backends take `&self` so several stores can share one instance behind an
/// [`Arc`].
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Returns the raw payload for `key`, or `None` when nothing was written yet.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the payload for `key`.
    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError>;

    /// Removes the entry for `key`; removing a missing entry is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 記憶體儲存，適合測試與模擬重新載入。 / In-memory backend used for tests and simulated reloads.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// 空白記憶體儲存。 / Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// 以既有快照建立儲存。 / Builds a backend pre-populated from a snapshot.
    pub fn from_snapshot(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// 複製目前所有條目。 / Copies every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries().clone()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// 以目錄保存每個鍵的 JSON 檔案。 / Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// 建立檔案儲存。 / Stores one file per key under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 儲存目錄。 / Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 條目路徑。 / File backing `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "FileStorage"
    }

    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StorageError> {
        write_atomic(&self.entry_path(key), payload.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write { path, source }),
        }
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(|source| StorageError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// 持久化切片。 / A single persisted projection `P` of a store, bound to one storage key.
///
/// `load` and `save` are best effort: failures are logged and swallowed so the
/// owning store keeps running on in-memory defaults. The `try_*` variants
/// surface the error for tooling.
pub struct PersistentSlice<P> {
    key: String,
    backend: Arc<dyn StorageBackend>,
    _projection: PhantomData<fn() -> P>,
}

impl<P> Clone for PersistentSlice<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            backend: Arc::clone(&self.backend),
            _projection: PhantomData,
        }
    }
}

impl<P> fmt::Debug for PersistentSlice<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentSlice")
            .field("key", &self.key)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl<P> PersistentSlice<P>
where
    P: Serialize + DeserializeOwned,
{
    /// 綁定儲存鍵。 / Binds the slice to `key` on `backend`.
    pub fn new(key: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            key: key.into(),
            backend,
            _projection: PhantomData,
        }
    }

    /// 儲存鍵。 / Storage key of the slice.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 讀取並回報錯誤。 / Reads and decodes the entry, surfacing failures.
    pub fn try_load(&self) -> Result<Option<P>, StorageError> {
        let Some(payload) = self.backend.load(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                key: self.key.clone(),
                source,
            })
    }

    /// 讀取最後寫入的狀態；失敗時回傳 `None`。 / Last written projection, or `None` on absence or failure.
    pub fn load(&self) -> Option<P> {
        match self.try_load() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    key = %self.key,
                    backend = self.backend.name(),
                    error = %err,
                    "ignoring unreadable persisted state"
                );
                None
            }
        }
    }

    /// 寫入並回報錯誤。 / Encodes and writes the entry, surfacing failures.
    pub fn try_save(&self, value: &P) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
                key: self.key.clone(),
                source,
            })?;
        self.backend.save(&self.key, &payload)
    }

    /// 盡力寫入，不重試。 / Best-effort write without retry.
    pub fn save(&self, value: &P) {
        if let Err(err) = self.try_save(value) {
            tracing::warn!(
                key = %self.key,
                backend = self.backend.name(),
                error = %err,
                "failed to persist state"
            );
        }
    }

    /// 刪除條目。 / Removes the entry; failures are logged.
    pub fn clear(&self) {
        if let Err(err) = self.backend.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %err, "failed to clear persisted state");
        }
    }
}

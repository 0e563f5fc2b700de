use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Key-value storage substrate the runtime data model persists into.
///
/// Every key holds one whole string value. Implementations are synchronous.
pub trait Storage: Send + Sync + Debug {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error>;

    /// Remove `key`. Removing a key that does not exist succeeds.
    fn remove(&self, key: &str) -> Result<(), std::io::Error>;

    /// Get the full path/key for display purposes
    fn get_path(&self, key: &str) -> String;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
        (**self).read(key)
    }

    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
        (**self).write(key, data)
    }

    fn remove(&self, key: &str) -> Result<(), std::io::Error> {
        (**self).remove(key)
    }

    fn get_path(&self, key: &str) -> String {
        (**self).get_path(key)
    }
}

/// In-process storage. Nothing survives the process, but writes are counted,
/// which makes it the substrate of choice for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with `data` under `key`. Seeding is not counted as a write.
    pub fn with_item(key: &str, data: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.to_string(), data.to_string());
        storage
    }

    /// Number of successful `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Make subsequent writes fail with `ErrorKind::Other`, simulating an unavailable substrate.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent reads fail, as an unreadable substrate would.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent removes fail.
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory storage is failing reads",
            ));
        }
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory storage is failing writes",
            ));
        }
        self.lock().insert(key.to_string(), data.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), std::io::Error> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory storage is failing removes",
            ));
        }
        self.lock().remove(key);
        Ok(())
    }

    fn get_path(&self, key: &str) -> String {
        format!("memory::{}", key)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::Storage;
    use std::io::{Read, Write};
    use std::path::PathBuf;

    /// One file per key inside `base_dir`.
    #[derive(Debug)]
    pub struct FileStorage {
        base_dir: PathBuf,
    }

    impl FileStorage {
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            Self {
                base_dir: directory.into(),
            }
        }
    }

    impl Storage for FileStorage {
        fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
            let path = self.base_dir.join(key);

            if !path.exists() {
                return Ok(None);
            }

            let mut file = std::fs::File::open(&path)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(Some(contents))
        }

        fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
            let path = self.base_dir.join(key);

            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Write to temporary file first
            let parent_dir = path.parent().unwrap_or(&self.base_dir);
            let mut tmp_file = tempfile::NamedTempFile::new_in(parent_dir)?;
            tmp_file.write_all(data.as_bytes())?;

            // Atomically move temp file to final location
            tmp_file.persist(&path).map_err(|e| e.error)?;

            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), std::io::Error> {
            match std::fs::remove_file(self.base_dir.join(key)) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        }

        fn get_path(&self, key: &str) -> String {
            self.base_dir.join(key).display().to_string()
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm {
    use super::Storage;
    use web_sys::{window, Storage as WebStorage};

    /// Browser `localStorage`, optionally namespaced by a key prefix.
    #[derive(Debug)]
    pub struct LocalStorage {
        prefix: String,
    }

    impl LocalStorage {
        pub fn new(app_id: &str) -> Self {
            Self {
                prefix: format!("{}_", app_id.replace('/', "_").replace('.', "_")),
            }
        }

        /// Keys are used as-is, without a prefix.
        pub fn unprefixed() -> Self {
            Self {
                prefix: String::new(),
            }
        }

        fn get_storage() -> Result<WebStorage, std::io::Error> {
            window()
                .ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "window not available")
                })?
                .local_storage()
                .map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::Other, "localStorage not available")
                })?
                .ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "localStorage is null")
                })
        }

        fn full_key(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }
    }

    impl Storage for LocalStorage {
        fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
            let storage = Self::get_storage()?;

            storage.get_item(&self.full_key(key)).map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "failed to read from localStorage",
                )
            })
        }

        fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
            let storage = Self::get_storage()?;

            storage.set_item(&self.full_key(key), data).map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::Other, "failed to write to localStorage")
            })
        }

        fn remove(&self, key: &str) -> Result<(), std::io::Error> {
            let storage = Self::get_storage()?;

            storage.remove_item(&self.full_key(key)).map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "failed to remove from localStorage",
                )
            })
        }

        fn get_path(&self, key: &str) -> String {
            format!("localStorage::{}", self.full_key(key))
        }
    }
}

/// Platform-specific storage factory
#[cfg(not(target_arch = "wasm32"))]
pub fn create_storage(directory: &str) -> Box<dyn Storage> {
    Box::new(native::FileStorage::new(directory))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn create_storage(app_id: &str) -> Box<dyn Storage> {
    Box::new(wasm::LocalStorage::new(app_id))
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm")))]
pub fn create_storage(app_id: &str) -> Box<dyn Storage> {
    log::warn!(
        "Built without the `wasm` feature: runtime data for {} is kept in memory only",
        app_id
    );
    Box::new(MemoryStorage::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_counts_writes_but_not_seeding() {
        let storage = MemoryStorage::with_item("k", "seed");
        assert_eq!(storage.write_count(), 0);
        assert_eq!(storage.read("k").unwrap(), Some("seed".to_string()));

        storage.write("k", "v").unwrap();
        storage.write("k", "v").unwrap();
        assert_eq!(storage.write_count(), 2);
        assert_eq!(storage.get("k"), Some("v".to_string()));
    }

    #[test]
    fn memory_storage_remove_missing_key_is_ok() {
        let storage = MemoryStorage::new();
        storage.remove("missing").unwrap();
        assert_eq!(storage.read("missing").unwrap(), None);
    }

    #[test]
    fn memory_storage_failing_writes_leave_content() {
        let storage = MemoryStorage::with_item("k", "old");
        storage.set_fail_writes(true);
        assert!(storage.write("k", "new").is_err());
        assert_eq!(storage.get("k"), Some("old".to_string()));
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn memory_storage_failing_reads_and_removes() {
        let storage = MemoryStorage::with_item("k", "v");
        storage.set_fail_reads(true);
        storage.set_fail_removes(true);
        assert!(storage.read("k").is_err());
        assert!(storage.remove("k").is_err());
        assert_eq!(storage.get("k"), Some("v".to_string()));

        storage.set_fail_reads(false);
        storage.set_fail_removes(false);
        storage.remove("k").unwrap();
        assert_eq!(storage.read("k").unwrap(), None);
    }

    #[test]
    fn arc_storage_shares_state() {
        let shared = Arc::new(MemoryStorage::new());
        let boxed: Box<dyn Storage> = Box::new(shared.clone());
        boxed.write("k", "v").unwrap();
        assert_eq!(shared.get("k"), Some("v".to_string()));
        assert_eq!(boxed.get_path("k"), "memory::k");
    }
}

//! The runtime data model: one get/set/delete surface over arbitrary keys,
//! written through to storage on every effective change.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::autosave::{AutosaveController, AutosaveState};
use crate::error::{Result, RuntimeDataError};
use crate::persistence::{Persistence, DEFAULT_STORAGE_KEY};
use crate::storage::Storage;
use crate::store::BackingStore;

/// File name used by [`RuntimeData::for_app`] inside the platform config directory.
#[cfg(not(target_arch = "wasm32"))]
pub const RUNTIME_DATA_FILENAME: &str = "runtime-data.json";

// Set while a claimed instance is alive; enforces one model per process.
static INSTANCE_EXISTS: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

// Releases the instance flag when dropped
#[derive(Debug)]
struct InstanceGuard;

impl InstanceGuard {
    fn claim() -> Result<Self> {
        INSTANCE_EXISTS
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| InstanceGuard)
            .map_err(|_| RuntimeDataError::InstanceAlreadyLoaded)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_EXISTS.store(false, Ordering::Release);
    }
}

/// Named values of any JSON shape, mirrored to a [`Storage`] substrate.
///
/// A fresh model is empty and not loaded. Writes made before [`init`](Self::init)
/// stay in memory and win over persisted values for the same key. After `init`
/// every write that changes a value is saved immediately, as one compact JSON
/// object under a single storage key, until
/// [`disable_save_on_change`](Self::disable_save_on_change) is called.
///
/// ```rust
/// use std::sync::Arc;
/// use runtime_data::{RuntimeData, storage::MemoryStorage};
///
/// let storage = Arc::new(MemoryStorage::with_item("runtimeData", r#"{"x":"xx"}"#));
/// let mut data = RuntimeData::with_storage(Box::new(storage.clone()));
/// data.init().unwrap();
/// assert_eq!(data.get("x"), Some(&serde_json::json!("xx")));
///
/// data.set("x", "y").unwrap();
/// assert_eq!(storage.get("runtimeData").as_deref(), Some(r#"{"x":"y"}"#));
/// ```
#[derive(Debug)]
pub struct RuntimeData {
    store: BackingStore,
    persistence: Persistence,
    autosave: AutosaveController,
    _instance_guard: Option<InstanceGuard>,
}

impl RuntimeData {
    /// Creates an unclaimed model over `storage`, using [`DEFAULT_STORAGE_KEY`].
    /// Any number of these may coexist; use it for tests and injection.
    pub fn with_storage(storage: Box<dyn Storage>) -> Self {
        Self::with_storage_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_storage_key(storage: Box<dyn Storage>, key: &str) -> Self {
        Self {
            store: BackingStore::new(),
            persistence: Persistence::new(storage, key),
            autosave: AutosaveController::new(),
            _instance_guard: None,
        }
    }

    /// Creates the process-wide model over `storage`.
    /// Fails while another claimed model is alive; dropping it releases the claim.
    pub fn acquire(storage: Box<dyn Storage>) -> Result<Self> {
        let guard = InstanceGuard::claim()?;
        let mut data = Self::with_storage(storage);
        data._instance_guard = Some(guard);
        Ok(data)
    }

    /// Creates the process-wide model in the platform's config location for `namespace`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn for_app(namespace: &str) -> Result<Self> {
        let project = directories::ProjectDirs::from("", "", namespace)
            .ok_or_else(|| RuntimeDataError::NoConfigDirectory(namespace.to_string()))?;
        let guard = InstanceGuard::claim()?;
        let storage = crate::storage::native::FileStorage::new(project.config_dir());
        let mut data = Self::with_storage_key(Box::new(storage), RUNTIME_DATA_FILENAME);
        data._instance_guard = Some(guard);
        info!("Runtime data stored at {}", data.storage_location());
        Ok(data)
    }

    /// Creates the process-wide model in the browser's `localStorage`, under
    /// [`DEFAULT_STORAGE_KEY`] with no prefix. A page has a single `localStorage`,
    /// so `namespace` only labels the log line.
    #[cfg(all(target_arch = "wasm32", feature = "wasm"))]
    pub fn for_app(namespace: &str) -> Result<Self> {
        let data = Self::acquire(Box::new(crate::storage::wasm::LocalStorage::unprefixed()))?;
        info!("Runtime data for {} stored at {}", namespace, data.storage_location());
        Ok(data)
    }

    /// Loads persisted data into the model and turns autosave on.
    ///
    /// Keys already set in memory keep their values; persisted data only fills
    /// in the rest. Only the first successful call reads storage. On error the
    /// model stays unloaded and its entries are untouched.
    pub fn init(&mut self) -> Result<()> {
        if self.autosave.is_loaded() {
            return Ok(());
        }
        if let Some(persisted) = self.persistence.load()? {
            let total = persisted.len();
            let filled = self.store.fill_missing(persisted);
            if filled < total {
                info!(
                    "Kept {} runtime data values set before initialization",
                    total - filled
                );
            }
        }
        self.autosave.mark_loaded();
        info!(
            "Runtime data initialized with {} entries ({:?})",
            self.store.len(),
            self.autosave.state()
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    /// Decodes the value under `key` as `T`. A value of another shape is reported as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Ignoring runtime data value for '{}': {}", key, e);
                None
            }
        }
    }

    /// Stores `value` under `key`. Returns whether the value changed.
    ///
    /// A change is saved right away when autosave is active. If that save
    /// fails the error is returned but the new value stays in memory.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<bool> {
        let changed = self.store.set(key, value.into());
        self.save_if_needed(changed)?;
        Ok(changed)
    }

    /// Like [`set`](Self::set) for any serializable value.
    pub fn set_serialized<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<bool> {
        let value = serde_json::to_value(value)?;
        self.set(key, value)
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        let removed = self.store.remove(key);
        self.save_if_needed(removed)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.entries().keys().map(String::as_str)
    }

    pub fn entries(&self) -> &Map<String, Value> {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Snapshot of exactly what is stored; absent fields are not defaulted.
    pub fn to_json(&self) -> Map<String, Value> {
        self.store.entries().clone()
    }

    /// The compact encoding that a save would write.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self.store.entries())?)
    }

    /// Empties the model, erases the persisted copy and starts a new lifecycle:
    /// the model is unloaded and autosave is enabled again for the next `init`.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear();
        self.autosave.reset();
        self.persistence.clear()?;
        info!("Runtime data reset");
        Ok(())
    }

    /// Stops saving on change for the rest of this lifecycle.
    pub fn disable_save_on_change(&mut self) {
        if self.autosave.state() != AutosaveState::Suspended {
            info!("Runtime data autosave disabled");
        }
        self.autosave.disable();
    }

    pub fn is_loaded(&self) -> bool {
        self.autosave.is_loaded()
    }

    pub fn autosave_state(&self) -> AutosaveState {
        self.autosave.state()
    }

    pub fn storage_location(&self) -> String {
        self.persistence.location()
    }

    fn save_if_needed(&self, changed: bool) -> Result<()> {
        if self.autosave.should_save(changed) {
            self.persistence.save(self.store.entries())?;
        }
        Ok(())
    }
}

impl Serialize for RuntimeData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.store.entries().serialize(serializer)
    }
}

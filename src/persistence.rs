//! Load and save the whole runtime data mapping under one storage key.

use log::debug;
use serde_json::{Map, Value};

use crate::error::{Result, RuntimeDataError};
use crate::storage::Storage;

/// Key under which the serialized mapping is stored by default.
pub const DEFAULT_STORAGE_KEY: &str = "runtimeData";

#[derive(Debug)]
pub struct Persistence {
    storage: Box<dyn Storage>,
    key: String,
}

impl Persistence {
    pub fn new(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Where the persisted copy lives, for logs and errors.
    pub fn location(&self) -> String {
        self.storage.get_path(&self.key)
    }

    /// Reads the persisted mapping. `Ok(None)` means nothing has been stored yet.
    pub fn load(&self) -> Result<Option<Map<String, Value>>> {
        let Some(contents) = self.storage.read(&self.key)? else {
            debug!("No runtime data at {}", self.location());
            return Ok(None);
        };

        let value: Value =
            serde_json::from_str(&contents).map_err(|source| RuntimeDataError::Corrupt {
                location: self.location(),
                source,
            })?;

        match value {
            Value::Object(map) => {
                debug!("Loaded {} runtime data entries from {}", map.len(), self.location());
                Ok(Some(map))
            }
            _ => Err(RuntimeDataError::NotAnObject {
                location: self.location(),
            }),
        }
    }

    /// Replaces the persisted copy with the compact encoding of `entries`.
    pub fn save(&self, entries: &Map<String, Value>) -> Result<()> {
        let encoded = serde_json::to_string(entries)?;
        self.storage.write(&self.key, &encoded)?;
        debug!("Saved {} runtime data entries to {}", entries.len(), self.location());
        Ok(())
    }

    /// Erases the persisted copy.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key)?;
        debug!("Cleared runtime data at {}", self.location());
        Ok(())
    }
}

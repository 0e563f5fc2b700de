//! Errors returned by the runtime data model and its storage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeDataError>;

#[derive(Error, Debug)]
pub enum RuntimeDataError {
    /// Another claimed instance of the runtime data model is alive in this process.
    #[error("runtime data is already loaded in this process")]
    InstanceAlreadyLoaded,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The persisted payload is not valid JSON.
    #[error("corrupt runtime data at {location}: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted payload is valid JSON but not an object.
    #[error("runtime data at {location} is not a JSON object")]
    NotAnObject { location: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no configuration directory for namespace '{0}'")]
    NoConfigDirectory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test error");
        let display = RuntimeDataError::from(io_error).to_string();
        assert!(display.contains("storage error"));
        assert!(display.contains("test error"));
    }

    #[test]
    fn corrupt_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = RuntimeDataError::Corrupt {
            location: "memory::runtimeData".to_string(),
            source,
        };
        assert!(error.to_string().contains("memory::runtimeData"));
        assert!(std::error::Error::source(&error).is_some());
    }
}

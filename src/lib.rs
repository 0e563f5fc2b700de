//! # runtime_data
//!
//! A process-wide runtime data model: named values of any JSON shape that can be
//! read and written without declaring them up front, and that are kept in sync
//! with a host-provided key-value store.
//!
//! The design priorities are:
//!
//! - **Ease of use:** one `get`/`set`/`delete` surface for every key, plus typed
//!   accessors for the keys the application knows about.
//! - **No redundant writes:** setting a key to the value it already holds never
//!   touches storage.
//! - **Safe start-up:** values written before [`RuntimeData::init`] are kept, and
//!   persisted data only fills in keys that are not set yet.
//! - **A switch that stays off:** once
//!   [`RuntimeData::disable_save_on_change`] is called nothing is written again
//!   until [`RuntimeData::reset`].
//!
//! **Note:** every save rewrites the whole mapping as one compact JSON object.
//! This is meant for small amounts of state, not as a database.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use runtime_data::{KnownFields, RuntimeData, storage::MemoryStorage};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut data = RuntimeData::with_storage(Box::new(storage.clone()));
//! data.init().unwrap();
//!
//! data.set("lastOpenedFile", "work.kdbx").unwrap();
//! data.set_skip_folder_rights_warning(true).unwrap();
//!
//! assert_eq!(data.skip_folder_rights_warning(), Some(true));
//! assert_eq!(
//!     storage.get("runtimeData").as_deref(),
//!     Some(r#"{"lastOpenedFile":"work.kdbx","skipFolderRightsWarning":true}"#)
//! );
//! ```

pub mod autosave;
pub mod error;
pub mod model;
pub mod persistence;
pub mod storage;
pub mod store;

pub use autosave::AutosaveState;
pub use error::{Result, RuntimeDataError};
pub use model::RuntimeData;
pub use persistence::DEFAULT_STORAGE_KEY;

// Re-export dependencies so users don't need to add them to their Cargo.toml
pub use paste;
pub use serde_json;

/// Declares typed accessors for statically known runtime data keys.
///
/// # Overview
/// The macro generates a trait, implemented for [`RuntimeData`], with three
/// methods per field plus a constant holding its storage key. Known fields live
/// in the same mapping as every other key; storage cannot tell them apart, and
/// an unset field reads as `None` rather than a default.
///
/// For a field `name: Type => "storedKey"` it generates:
/// - `NAME_KEY`: the storage key,
/// - `name(&self) -> Option<Type>`,
/// - `set_name(&mut self, Type) -> Result<bool>`, saving like [`RuntimeData::set`],
/// - `remove_name(&mut self) -> Result<()>`.
///
/// `Type` must implement `serde::Serialize` and `serde::de::DeserializeOwned`.
///
/// # Example
///
/// ```rust
/// use runtime_data::{runtime_fields, RuntimeData, storage::MemoryStorage};
///
/// runtime_fields! {
///     /// Window state remembered between runs.
///     pub trait WindowFields {
///         /// Last window width in pixels.
///         window_width: u32 => "windowWidth",
///         /// Whether the sidebar was collapsed.
///         sidebar_collapsed: bool => "sidebarCollapsed",
///     }
/// }
///
/// let mut data = RuntimeData::with_storage(Box::new(MemoryStorage::new()));
/// data.set_window_width(1280).unwrap();
/// assert_eq!(data.window_width(), Some(1280));
/// assert_eq!(data.get(<RuntimeData as WindowFields>::WINDOW_WIDTH_KEY), Some(&runtime_data::serde_json::json!(1280)));
/// assert_eq!(data.sidebar_collapsed(), None);
/// ```
#[macro_export]
macro_rules! runtime_fields {
    (
        $(#[$outer:meta])*
        $vis:vis trait $name:ident {
            $(
                $(#[$inner:meta])*
                $field:ident: $type:ty => $saved_name:expr,
            )*
        }
    ) => {
        $crate::paste::paste! {
            $(#[$outer])*
            $vis trait $name {
                $(
                    /// Storage key of this field.
                    const [<$field:upper _KEY>]: &'static str;

                    $(#[$inner])*
                    fn $field(&self) -> Option<$type>;

                    /// Stores a new value; returns whether it changed.
                    fn [<set_ $field>](&mut self, value: $type) -> $crate::Result<bool>;

                    /// Removes the value so the field reads as `None`.
                    fn [<remove_ $field>](&mut self) -> $crate::Result<()>;
                )*
            }

            impl $name for $crate::RuntimeData {
                $(
                    const [<$field:upper _KEY>]: &'static str = $saved_name;

                    fn $field(&self) -> Option<$type> {
                        self.get_as::<$type>($saved_name)
                    }

                    fn [<set_ $field>](&mut self, value: $type) -> $crate::Result<bool> {
                        self.set_serialized($saved_name, &value)
                    }

                    fn [<remove_ $field>](&mut self) -> $crate::Result<()> {
                        self.delete($saved_name)
                    }
                )*
            }
        }
    };
}

runtime_fields! {
    /// Keys the application itself reads and writes.
    pub trait KnownFields {
        /// Set once the user chose not to be warned again about a folder without write access.
        skip_folder_rights_warning: bool => "skipFolderRightsWarning",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn known_field_shares_the_generic_surface() {
        let mut data = RuntimeData::with_storage(Box::new(MemoryStorage::new()));
        assert!(data.set_skip_folder_rights_warning(true).unwrap());
        assert_eq!(data.skip_folder_rights_warning(), Some(true));
        assert_eq!(data.get("skipFolderRightsWarning"), Some(&serde_json::json!(true)));

        data.set("skipFolderRightsWarning", false).unwrap();
        assert_eq!(data.skip_folder_rights_warning(), Some(false));
    }

    #[test]
    fn known_field_is_not_defaulted() {
        let data = RuntimeData::with_storage(Box::new(MemoryStorage::new()));
        assert_eq!(data.skip_folder_rights_warning(), None);
        assert!(data.to_json().is_empty());
        assert_eq!(
            <RuntimeData as KnownFields>::SKIP_FOLDER_RIGHTS_WARNING_KEY,
            "skipFolderRightsWarning"
        );
    }

    #[test]
    fn known_field_reset_and_remove() {
        let storage = Arc::new(MemoryStorage::new());
        let mut data = RuntimeData::with_storage(Box::new(storage.clone()));
        data.init().unwrap();

        data.set_skip_folder_rights_warning(true).unwrap();
        assert!(!data.set_skip_folder_rights_warning(true).unwrap());
        assert_eq!(storage.write_count(), 1);

        data.remove_skip_folder_rights_warning().unwrap();
        assert_eq!(data.skip_folder_rights_warning(), None);
        assert_eq!(storage.get(DEFAULT_STORAGE_KEY).as_deref(), Some("{}"));

        data.set_skip_folder_rights_warning(true).unwrap();
        data.reset().unwrap();
        assert_eq!(data.skip_folder_rights_warning(), None);
        assert_eq!(data.get("skipFolderRightsWarning"), None);
        assert_eq!(storage.get(DEFAULT_STORAGE_KEY), None);
    }
}

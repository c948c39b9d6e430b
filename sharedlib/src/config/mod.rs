//! Library configuration.
//!
//! A [`ConfigSnapshot`] is the immutable, update-time copy of a library's
//! configuration. Snapshots are normally produced from the property
//! dictionary delivered by the configuration service
//! ([`ConfigSnapshot::from_properties`]) or from an ini file
//! ([`LibraryConfigFile`]).

mod error;
mod file;
mod snapshot;
mod visibility;

pub use error::ConfigError;
pub use file::LibraryConfigFile;
pub use snapshot::{ConfigSnapshot, Properties, PropertyValue};
pub use visibility::{ApiType, ApiVisibility};

/// Property key for the library id.
pub const KEY_ID: &str = "id";
/// Property key for the display name.
pub const KEY_NAME: &str = "name";
/// Property key for the description.
pub const KEY_DESCRIPTION: &str = "description";
/// Property key for direct file references.
pub const KEY_FILE_REF: &str = "fileRef";
/// Property key for folder references.
pub const KEY_FOLDER_REF: &str = "folderRef";
/// Property key for fileset references.
pub const KEY_FILESET_REF: &str = "filesetRef";
/// Property key for the API type visibility list.
pub const KEY_API_VISIBILITY: &str = "apiTypeVisibility";

/// Split a list-valued setting on commas and whitespace.
pub(crate) fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

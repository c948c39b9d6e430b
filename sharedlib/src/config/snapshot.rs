//! Immutable configuration snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    split_list, ApiVisibility, ConfigError, KEY_API_VISIBILITY, KEY_DESCRIPTION, KEY_FILESET_REF,
    KEY_FILE_REF, KEY_FOLDER_REF, KEY_ID, KEY_NAME,
};

/// A single configuration property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A scalar value. Used for list keys it is split on commas and spaces.
    Single(String),
    /// An already split list of values.
    List(Vec<String>),
}

impl PropertyValue {
    /// The value as list items.
    pub fn items(&self) -> Vec<String> {
        match self {
            PropertyValue::Single(s) => split_list(s).map(str::to_string).collect(),
            PropertyValue::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// The value as a scalar. Lists are joined with commas.
    pub fn scalar(&self) -> String {
        match self {
            PropertyValue::Single(s) => s.trim().to_string(),
            PropertyValue::List(items) => items.join(","),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(value: Vec<&str>) -> Self {
        PropertyValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// The property dictionary delivered with a configuration update.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Update-time copy of a library's configuration.
///
/// Captured once per update and never mutated; every [`Generation`] holds
/// the snapshot it was built from.
///
/// Reference lists are de-duplicated, keeping first-seen order.
///
/// [`Generation`]: crate::generation::Generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    id: String,
    name: Option<String>,
    description: Option<String>,
    file_refs: Vec<String>,
    folder_refs: Vec<String>,
    fileset_refs: Vec<String>,
    api_visibility: ApiVisibility,
}

impl ConfigSnapshot {
    /// An empty snapshot for the given library id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            file_refs: Vec::new(),
            folder_refs: Vec::new(),
            fileset_refs: Vec::new(),
            api_visibility: ApiVisibility::default(),
        }
    }

    /// Build a snapshot from a configuration property dictionary.
    ///
    /// Recognised keys are `id`, `name`, `description`, `fileRef`,
    /// `folderRef`, `filesetRef` and `apiTypeVisibility`; anything else is
    /// ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingId`] if `id` is absent or blank
    /// - [`ConfigError::UnknownApiType`] for a bad visibility entry
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let id = props
            .get(KEY_ID)
            .map(PropertyValue::scalar)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingId)?;

        let mut snapshot = Self::new(id);
        snapshot.name = scalar(props, KEY_NAME);
        snapshot.description = scalar(props, KEY_DESCRIPTION);

        for r in items(props, KEY_FILE_REF) {
            snapshot = snapshot.with_file_ref(r);
        }
        for r in items(props, KEY_FOLDER_REF) {
            snapshot = snapshot.with_folder_ref(r);
        }
        for r in items(props, KEY_FILESET_REF) {
            snapshot = snapshot.with_fileset_ref(r);
        }

        if let Some(raw) = props.get(KEY_API_VISIBILITY) {
            snapshot.api_visibility = ApiVisibility::parse(&raw.scalar())?;
        }

        Ok(snapshot)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a direct file reference.
    pub fn with_file_ref(mut self, reference: impl Into<String>) -> Self {
        push_unique(&mut self.file_refs, reference.into());
        self
    }

    /// Add a folder reference.
    pub fn with_folder_ref(mut self, reference: impl Into<String>) -> Self {
        push_unique(&mut self.folder_refs, reference.into());
        self
    }

    /// Add a fileset reference.
    pub fn with_fileset_ref(mut self, reference: impl Into<String>) -> Self {
        push_unique(&mut self.fileset_refs, reference.into());
        self
    }

    /// Replace the API visibility set.
    pub fn with_api_visibility(mut self, visibility: ApiVisibility) -> Self {
        self.api_visibility = visibility;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn file_refs(&self) -> &[String] {
        &self.file_refs
    }

    pub fn folder_refs(&self) -> &[String] {
        &self.folder_refs
    }

    pub fn fileset_refs(&self) -> &[String] {
        &self.fileset_refs
    }

    pub fn api_visibility(&self) -> &ApiVisibility {
        &self.api_visibility
    }
}

fn scalar(props: &Properties, key: &str) -> Option<String> {
    props
        .get(key)
        .map(PropertyValue::scalar)
        .filter(|s| !s.is_empty())
}

fn items(props: &Properties, key: &str) -> Vec<String> {
    props.get(key).map(PropertyValue::items).unwrap_or_default()
}

fn push_unique(refs: &mut Vec<String>, reference: String) {
    let reference = reference.trim();
    if !reference.is_empty() && !refs.iter().any(|r| r == reference) {
        refs.push(reference.to_string());
    }
}

//! The public listing of published libraries.

use dashmap::DashMap;
use serde::Serialize;

use crate::config::{ApiVisibility, ConfigSnapshot};
use crate::generation::GenerationId;

/// What the listing shows for one published library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub library_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub api_visibility: ApiVisibility,
    pub generation: GenerationId,
}

impl ListingEntry {
    pub fn from_snapshot(snapshot: &ConfigSnapshot, generation: GenerationId) -> Self {
        Self {
            library_id: snapshot.id().to_string(),
            name: snapshot.name().map(str::to_string),
            description: snapshot.description().map(str::to_string),
            api_visibility: snapshot.api_visibility().clone(),
            generation,
        }
    }
}

/// Registry of publicly visible libraries.
pub trait LibraryListing: Send + Sync {
    /// Add or replace the entry for `entry.library_id`.
    fn register(&self, entry: &ListingEntry);

    /// Remove the entry for `library_id`. Unknown ids are ignored.
    fn unregister(&self, library_id: &str);
}

/// Listing that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListing;

impl LibraryListing for NullListing {
    fn register(&self, _entry: &ListingEntry) {}

    fn unregister(&self, _library_id: &str) {}
}

/// Listing kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryListing {
    entries: DashMap<String, ListingEntry>,
}

impl InMemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, library_id: &str) -> Option<ListingEntry> {
        self.entries.get(library_id).map(|e| e.value().clone())
    }

    pub fn contains(&self, library_id: &str) -> bool {
        self.entries.contains_key(library_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LibraryListing for InMemoryListing {
    fn register(&self, entry: &ListingEntry) {
        self.entries.insert(entry.library_id.clone(), entry.clone());
    }

    fn unregister(&self, library_id: &str) {
        self.entries.remove(library_id);
    }
}

//! Outbound collaborators: change notification and the public listing.
//!
//! A [`LibraryController`](crate::controller::LibraryController) tells its
//! [`ChangeNotifier`] about every successful publish and every applied
//! steady-state fileset update, and keeps the library's [`ListingEntry`]
//! registered with a [`LibraryListing`] while it has a current generation.
//!
//! # Thread Safety
//!
//! Both traits are called outside the controller lock, from whichever thread
//! completed a generation. Implementations must be `Send + Sync`.

mod broadcast;
mod listing;

use serde::Serialize;

use crate::generation::GenerationId;

pub use broadcast::{BroadcastNotifier, DEFAULT_NOTIFY_CAPACITY};
pub use listing::{InMemoryListing, LibraryListing, ListingEntry, NullListing};

/// A library's visible content changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryChanged {
    /// Resource id of the library.
    pub library_id: String,
    /// The generation consumers now observe.
    pub generation: GenerationId,
}

/// Receives [`LibraryChanged`] events.
///
/// Exactly one event is sent per successful publish and per applied
/// steady-state fileset update.
pub trait ChangeNotifier: Send + Sync {
    fn library_changed(&self, event: LibraryChanged);
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn library_changed(&self, _event: LibraryChanged) {}
}

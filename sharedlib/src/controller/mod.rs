//! Library controller: the `{current, next}` generation slots.
//!
//! Every [`update`](LibraryController::update) supersedes any generation
//! still resolving and builds a new one into `next`. When `next` finishes
//! resolving it publishes itself: it becomes `current`, the generation it
//! replaces is cancelled, and consumers are notified.
//!
//! # Locking
//!
//! The slot mutex guards only `next`, the deleted flag and writes to
//! `current`. Fileset subscription and delivery run outside it, so a
//! resolver that delivers synchronously from `subscribe` cannot deadlock the
//! controller. Readers never take the mutex: `current` is an
//! [`ArcSwapOption`] loaded once per read.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use sharedlib::config::ConfigSnapshot;
//! use sharedlib::controller::{Collaborators, ControllerConfig, LibraryController};
//! use sharedlib::testing::ManualFilesetResolver;
//!
//! let resolver = Arc::new(ManualFilesetResolver::new());
//! let controller = LibraryController::new(
//!     "lib",
//!     Collaborators::new(resolver.clone()),
//!     ControllerConfig::default().with_cache_root(std::env::temp_dir().join("sharedlib-doc")),
//! );
//!
//! controller.update(ConfigSnapshot::new("lib").with_fileset_ref("deps"));
//! assert!(controller.files().is_none());
//!
//! resolver.deliver("deps", [PathBuf::from("/libs/a.jar")]);
//! assert_eq!(controller.filesets().unwrap().len(), 1);
//! ```

mod config;
mod status;

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ApiVisibility, ConfigSnapshot};
use crate::content::{
    CacheLayout, Container, ContainerFactory, Fileset, FsContainerFactory, FsPathResolver,
    PathResolver,
};
use crate::fileset::FilesetResolver;
use crate::generation::{
    Generation, GenerationClock, GenerationContext, GenerationId, GenerationListener,
};
use crate::notify::{ChangeNotifier, LibraryChanged, LibraryListing, ListingEntry, NullListing, NullNotifier};

pub use config::{default_cache_root, ControllerConfig, CACHE_DIR_NAME};
pub use status::{ControllerState, ControllerStatus};

/// The collaborators a controller talks to.
///
/// Only the fileset resolver is required. Paths default to an empty
/// [`FsPathResolver`] (every file and folder reference drops), containers to
/// [`FsContainerFactory`], and notification and listing to no-ops.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn FilesetResolver>,
    pub paths: Arc<dyn PathResolver>,
    pub containers: Arc<dyn ContainerFactory>,
    pub notifier: Arc<dyn ChangeNotifier>,
    pub listing: Arc<dyn LibraryListing>,
}

impl Collaborators {
    pub fn new(resolver: Arc<dyn FilesetResolver>) -> Self {
        Self {
            resolver,
            paths: Arc::new(FsPathResolver::new()),
            containers: Arc::new(FsContainerFactory::new()),
            notifier: Arc::new(NullNotifier),
            listing: Arc::new(NullListing),
        }
    }

    pub fn with_paths(mut self, paths: Arc<dyn PathResolver>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_containers(mut self, containers: Arc<dyn ContainerFactory>) -> Self {
        self.containers = containers;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_listing(mut self, listing: Arc<dyn LibraryListing>) -> Self {
        self.listing = listing;
        self
    }
}

#[derive(Debug, Default)]
struct Slots {
    next: Option<Arc<Generation>>,
    deleted: bool,
}

/// Owns the generations of one shared library resource.
pub struct LibraryController {
    resource_id: String,
    config: ControllerConfig,
    clock: GenerationClock,
    context: Arc<GenerationContext>,
    notifier: Arc<dyn ChangeNotifier>,
    listing: Arc<dyn LibraryListing>,
    slots: Mutex<Slots>,
    /// Written only while `slots` is held.
    current: ArcSwapOption<Generation>,
    /// Orders listing registration against deletion.
    listing_order: Mutex<()>,
    me: Weak<LibraryController>,
}

impl LibraryController {
    /// Create a controller whose generation ids start at 1.
    pub fn new(
        resource_id: impl Into<String>,
        collaborators: Collaborators,
        config: ControllerConfig,
    ) -> Arc<Self> {
        Self::with_clock(resource_id, collaborators, config, GenerationClock::new())
    }

    /// Create a controller drawing generation ids from `clock`.
    pub fn with_clock(
        resource_id: impl Into<String>,
        collaborators: Collaborators,
        config: ControllerConfig,
        clock: GenerationClock,
    ) -> Arc<Self> {
        let resource_id = resource_id.into();
        let context = Arc::new(GenerationContext::new(
            resource_id.clone(),
            collaborators.paths,
            collaborators.containers,
            collaborators.resolver,
            config.cache_root.clone(),
        ));

        Arc::new_cyclic(|me| Self {
            resource_id,
            config,
            clock,
            context,
            notifier: collaborators.notifier,
            listing: collaborators.listing,
            slots: Mutex::new(Slots::default()),
            current: ArcSwapOption::empty(),
            listing_order: Mutex::new(()),
            me: me.clone(),
        })
    }

    /// Start a new generation from `snapshot`.
    ///
    /// Any generation still resolving is cancelled first. The published
    /// generation, if any, stays visible until the new one is resolved.
    /// Returns the new generation's id, or `None` once deleted.
    pub fn update(&self, snapshot: ConfigSnapshot) -> Option<GenerationId> {
        let generation = {
            let mut slots = self.slots.lock();
            if slots.deleted {
                warn!(library = %self.resource_id, "Update after delete ignored");
                return None;
            }

            if let Some(superseded) = slots.next.take() {
                debug!(
                    library = %self.resource_id,
                    generation = %superseded.id(),
                    "Superseding unresolved generation"
                );
                superseded.cancel();
            }

            let listener: Weak<dyn GenerationListener> = self.me.clone();
            let generation = Generation::build(
                self.clock.next(),
                Arc::new(snapshot),
                Arc::clone(&self.context),
                listener,
            );
            slots.next = Some(Arc::clone(&generation));
            generation
        };

        debug!(
            library = %self.resource_id,
            generation = %generation.id(),
            filesets = generation.snapshot().fileset_refs().len(),
            "Generation started"
        );
        generation.fetch_filesets();
        Some(generation.id())
    }

    /// Make `generation` current.
    ///
    /// Refused if the generation was cancelled, already published, or the
    /// library deleted. Called automatically when a generation resolves.
    pub fn publish(&self, generation: &Arc<Generation>) -> bool {
        let replaced = {
            let mut slots = self.slots.lock();
            if slots.deleted || !generation.mark_published() {
                debug!(
                    library = %self.resource_id,
                    generation = %generation.id(),
                    "Publish aborted"
                );
                return false;
            }

            let previous = self.current.swap(Some(Arc::clone(generation)));
            if slots
                .next
                .as_ref()
                .is_some_and(|next| Arc::ptr_eq(next, generation))
            {
                slots.next = None;
            }
            if let Some(previous) = &previous {
                previous.cancel();
            }
            previous.map(|p| p.id())
        };

        info!(
            library = %self.resource_id,
            generation = %generation.id(),
            replaced = ?replaced,
            "Generation published"
        );

        if self.register_listing(generation) {
            self.notify(generation);
        }
        true
    }

    /// Cancel every generation and remove the library from the listing.
    ///
    /// Idempotent; returns `false` if already deleted.
    pub fn delete(&self) -> bool {
        let cancelled = {
            let mut slots = self.slots.lock();
            if slots.deleted {
                return false;
            }
            slots.deleted = true;

            let next = slots.next.take();
            let current = self.current.swap(None);
            let mut cancelled = Vec::new();
            for generation in next.iter().chain(current.iter()) {
                generation.cancel();
                cancelled.push(generation.id());
            }
            cancelled
        };

        {
            let _order = self.listing_order.lock();
            self.listing.unregister(&self.resource_id);
        }

        if self.config.sweep_on_delete {
            if let Err(e) = self.context.cache().sweep() {
                warn!(library = %self.resource_id, error = %e, "Failed to sweep cache directory");
            }
        }

        info!(library = %self.resource_id, cancelled = cancelled.len(), "Library deleted");
        true
    }

    fn register_listing(&self, generation: &Arc<Generation>) -> bool {
        let _order = self.listing_order.lock();
        if generation.is_cancelled() {
            debug!(
                library = %self.resource_id,
                generation = %generation.id(),
                "Superseded before listing"
            );
            return false;
        }
        self.listing
            .register(&ListingEntry::from_snapshot(generation.snapshot(), generation.id()));
        true
    }

    fn notify(&self, generation: &Generation) {
        self.notifier.library_changed(LibraryChanged {
            library_id: self.resource_id.clone(),
            generation: generation.id(),
        });
    }

    fn is_current(&self, generation: &Arc<Generation>) -> bool {
        (*self.current.load())
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, generation))
    }

    fn read<R>(&self, f: impl FnOnce(&Generation) -> R) -> Option<R> {
        let current = self.current.load();
        (*current).as_deref().map(f)
    }

    /// The published generation.
    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.load_full()
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheLayout {
        self.context.cache()
    }

    pub fn is_deleted(&self) -> bool {
        self.slots.lock().deleted
    }

    pub fn status(&self) -> ControllerStatus {
        let slots = self.slots.lock();
        let current = self.current.load();
        let current = (*current).as_ref();
        ControllerStatus {
            state: ControllerState::from_slots(slots.deleted, current.is_some(), slots.next.is_some()),
            current_generation: current.map(|g| g.id()),
            next_generation: slots.next.as_ref().map(|g| g.id()),
            outstanding: slots.next.as_ref().map_or(0, |g| g.outstanding()),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.read(|g| g.snapshot().id().to_string())
    }

    pub fn name(&self) -> Option<String> {
        self.read(|g| g.snapshot().name().map(str::to_string)).flatten()
    }

    pub fn description(&self) -> Option<String> {
        self.read(|g| g.snapshot().description().map(str::to_string))
            .flatten()
    }

    pub fn files(&self) -> Option<Arc<[PathBuf]>> {
        self.read(Generation::files)
    }

    pub fn folders(&self) -> Option<Arc<[PathBuf]>> {
        self.read(Generation::folders)
    }

    pub fn filesets(&self) -> Option<Vec<Fileset>> {
        self.read(Generation::filesets)
    }

    pub fn containers(&self) -> Option<Vec<Container>> {
        self.read(Generation::containers)
    }

    pub fn api_visibility(&self) -> Option<ApiVisibility> {
        self.read(|g| g.snapshot().api_visibility().clone())
    }
}

impl GenerationListener for LibraryController {
    fn generation_resolved(&self, generation: &Arc<Generation>) {
        self.publish(generation);
    }

    fn generation_changed(&self, generation: &Arc<Generation>) {
        // Unlocked check: a publish landing between it and `notify` can let one
        // event name a generation superseded a moment earlier. Receivers
        // re-read `current`.
        if generation.is_cancelled() || !self.is_current(generation) {
            debug!(
                library = %self.resource_id,
                generation = %generation.id(),
                "Change to unpublished generation"
            );
            return;
        }
        debug!(library = %self.resource_id, generation = %generation.id(), "Published content changed");
        self.notify(generation);
    }
}

impl std::fmt::Debug for LibraryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryController")
            .field("resource_id", &self.resource_id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

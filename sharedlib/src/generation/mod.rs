//! Library generations.
//!
//! A [`Generation`] is one versioned view of a library: the configuration
//! snapshot it was built from, the synchronously resolved files and folders,
//! and the fileset values delivered so far.
//!
//! # Lifecycle
//!
//! ```text
//! build() ──► Building ──fetch_filesets()──► Resolved ──publish──► Published
//!                │                              │                     │
//!                └──────────── cancel() ────────┴─────────────────────┴──► Cancelled
//! ```
//!
//! A generation reaching `Resolved` tells its [`GenerationListener`] exactly
//! once. Whether it is then published is the controller's decision.
//!
//! # Thread Safety
//!
//! Every piece of mutable state (fileset values, outstanding ids,
//! subscription handles) is individually synchronised, so resolver threads
//! deliver values without touching the controller's lock.

mod clock;
mod subscription;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ConfigSnapshot;
use crate::content::{
    CacheLayout, Container, ContainerFactory, Fileset, PathResolver, ResolvedContentSet,
};
use crate::fileset::{FilesetResolutionTracker, FilesetResolver, NotificationOutcome};

pub use clock::{GenerationClock, GenerationId};
use subscription::{FilesetSubscription, SubscriptionRegistry};

/// Observable state of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Waiting for at least one fileset's first value.
    Building,
    /// Fully resolved, not (yet) published.
    Resolved,
    /// The library's current generation.
    Published,
    /// Superseded or deleted. Terminal.
    Cancelled,
}

/// Receives a generation's lifecycle events.
pub trait GenerationListener: Send + Sync {
    /// Every fileset reference has its first value. Called at most once.
    fn generation_resolved(&self, generation: &Arc<Generation>);

    /// A fileset value changed after the generation was resolved.
    fn generation_changed(&self, generation: &Arc<Generation>);
}

/// Collaborators shared by every generation of one library resource.
pub struct GenerationContext {
    resource_id: String,
    paths: Arc<dyn PathResolver>,
    containers: Arc<dyn ContainerFactory>,
    resolver: Arc<dyn FilesetResolver>,
    cache: CacheLayout,
}

impl GenerationContext {
    pub fn new(
        resource_id: impl Into<String>,
        paths: Arc<dyn PathResolver>,
        containers: Arc<dyn ContainerFactory>,
        resolver: Arc<dyn FilesetResolver>,
        cache_root: impl Into<PathBuf>,
    ) -> Self {
        let resource_id = resource_id.into();
        let cache = CacheLayout::new(cache_root, resource_id.clone());
        Self {
            resource_id,
            paths,
            containers,
            resolver,
            cache,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn cache(&self) -> &CacheLayout {
        &self.cache
    }

    fn build_container(&self, generation: GenerationId, source_name: &str, source: &Path) -> Option<Container> {
        let cache_dir = self.cache.source_dir(generation, source_name);
        let container = self.containers.build(&cache_dir, source);
        if container.is_none() {
            debug!(
                library = %self.resource_id,
                %generation,
                source = %source.display(),
                "No container for source"
            );
        }
        container
    }
}

impl fmt::Debug for GenerationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("resource_id", &self.resource_id)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// One versioned, possibly still resolving view of a library.
pub struct Generation {
    id: GenerationId,
    snapshot: Arc<ConfigSnapshot>,
    content: ResolvedContentSet,
    filesets: DashMap<String, Fileset>,
    tracker: OnceLock<FilesetResolutionTracker>,
    subscriptions: SubscriptionRegistry,
    cancel: CancellationToken,
    fetch_started: AtomicBool,
    resolved: AtomicBool,
    published: AtomicBool,
    context: Arc<GenerationContext>,
    listener: Weak<dyn GenerationListener>,
    me: Weak<Generation>,
}

impl Generation {
    /// Build a generation from `snapshot`.
    ///
    /// File and folder references are resolved here; one that does not
    /// resolve is dropped with a warning. Fileset references are only
    /// resolved once [`fetch_filesets`](Self::fetch_filesets) is called.
    pub fn build(
        id: GenerationId,
        snapshot: Arc<ConfigSnapshot>,
        context: Arc<GenerationContext>,
        listener: Weak<dyn GenerationListener>,
    ) -> Arc<Self> {
        let library = context.resource_id();

        if let Err(e) = context.cache.reset_generation(id) {
            warn!(library, generation = %id, error = %e, "Failed to reset generation cache directory");
        }

        let files: Vec<PathBuf> = snapshot
            .file_refs()
            .iter()
            .filter_map(|r| {
                let path = context.paths.resolve_file(r);
                if path.is_none() {
                    warn!(library, generation = %id, reference = %r, "Dropping unresolved file reference");
                }
                path
            })
            .collect();

        let folders: Vec<PathBuf> = snapshot
            .folder_refs()
            .iter()
            .filter_map(|r| {
                let path = context.paths.resolve_folder(r);
                if path.is_none() {
                    warn!(library, generation = %id, reference = %r, "Dropping unresolved folder reference");
                }
                path
            })
            .collect();

        let containers: Vec<Container> = files
            .iter()
            .chain(folders.iter())
            .filter_map(|path| context.build_container(id, &source_name(path), path))
            .collect();

        debug!(
            library,
            generation = %id,
            files = files.len(),
            folders = folders.len(),
            containers = containers.len(),
            filesets = snapshot.fileset_refs().len(),
            "Generation built"
        );

        let content = ResolvedContentSet::new(files, folders, containers);

        Arc::new_cyclic(|me| Self {
            id,
            snapshot,
            content,
            filesets: DashMap::new(),
            tracker: OnceLock::new(),
            subscriptions: SubscriptionRegistry::default(),
            cancel: CancellationToken::new(),
            fetch_started: AtomicBool::new(false),
            resolved: AtomicBool::new(false),
            published: AtomicBool::new(false),
            context,
            listener,
            me: me.clone(),
        })
    }

    /// Subscribe to every fileset reference.
    ///
    /// With no fileset references the generation is resolved immediately.
    /// Otherwise the outstanding ids are seeded first, then one subscription
    /// is placed per id; placement stops as soon as the generation is seen
    /// cancelled. Only the first call has any effect.
    pub fn fetch_filesets(&self) {
        if self.fetch_started.swap(true, Ordering::AcqRel) {
            debug!(generation = %self.id, "Filesets already fetched");
            return;
        }

        let refs = self.snapshot.fileset_refs();
        if refs.is_empty() {
            self.mark_resolved();
            return;
        }

        self.tracker
            .get_or_init(|| FilesetResolutionTracker::new(refs.iter().cloned()));

        let resolver = &self.context.resolver;
        for ref_id in refs {
            if self.is_cancelled() {
                debug!(generation = %self.id, fileset = %ref_id, "Cancelled while subscribing");
                return;
            }

            let subscription = Arc::new(FilesetSubscription::new(ref_id.clone(), self.me.clone()));
            match resolver.subscribe(ref_id, subscription) {
                Ok(handle) => {
                    if let Err(handle) = self.subscriptions.insert(handle, &self.cancel) {
                        // Cancelled while the registration was in flight
                        debug!(generation = %self.id, fileset = %ref_id, "Undoing late subscription");
                        resolver.unsubscribe(&handle);
                    }
                }
                Err(e) if e.is_shutdown() => {
                    debug!(generation = %self.id, fileset = %ref_id, "Resolver shutting down, not subscribing");
                    return;
                }
                Err(e) => {
                    warn!(
                        library = self.context.resource_id(),
                        generation = %self.id,
                        fileset = %ref_id,
                        error = %e,
                        "Fileset subscription failed"
                    );
                }
            }
        }
    }

    /// Cancel this generation and release its subscriptions. Idempotent.
    pub fn cancel(&self) {
        let first = !self.cancel.is_cancelled();
        self.cancel.cancel();

        let handles = self.subscriptions.drain();
        for handle in &handles {
            self.context.resolver.unsubscribe(handle);
        }

        if first {
            debug!(
                library = self.context.resource_id(),
                generation = %self.id,
                released = handles.len(),
                "Generation cancelled"
            );
        }
    }

    pub(crate) fn on_fileset_resolved(&self, ref_id: &str, fileset: Fileset) {
        if self.is_cancelled() {
            return;
        }
        let Some(tracker) = self.tracker.get() else {
            debug!(generation = %self.id, fileset = ref_id, "Delivery before fetch, ignoring");
            return;
        };

        let outcome = tracker.record(ref_id, || {
            self.filesets.insert(ref_id.to_string(), fileset);
        });

        match outcome {
            NotificationOutcome::Completed => self.mark_resolved(),
            NotificationOutcome::Updated => {
                debug!(generation = %self.id, fileset = ref_id, "Fileset changed");
                if let (Some(me), Some(listener)) = (self.me.upgrade(), self.listener.upgrade()) {
                    listener.generation_changed(&me);
                }
            }
            NotificationOutcome::Recorded => {
                debug!(
                    generation = %self.id,
                    fileset = ref_id,
                    outstanding = tracker.outstanding(),
                    "Fileset resolved"
                );
            }
            NotificationOutcome::Duplicate => {
                debug!(generation = %self.id, fileset = ref_id, "Repeat fileset value before completion");
            }
        }
    }

    fn mark_resolved(&self) {
        if self.resolved.swap(true, Ordering::AcqRel) {
            debug_assert!(false, "generation {} resolved twice", self.id);
            return;
        }
        if self.is_cancelled() {
            return;
        }

        debug!(library = self.context.resource_id(), generation = %self.id, "Generation resolved");
        if let (Some(me), Some(listener)) = (self.me.upgrade(), self.listener.upgrade()) {
            listener.generation_resolved(&me);
        }
    }

    /// Record publication. Fails if cancelled or already published.
    pub(crate) fn mark_published(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        !self.published.swap(true, Ordering::AcqRel)
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> GenerationState {
        if self.is_cancelled() {
            GenerationState::Cancelled
        } else if self.published.load(Ordering::Acquire) {
            GenerationState::Published
        } else if self.resolved.load(Ordering::Acquire) {
            GenerationState::Resolved
        } else {
            GenerationState::Building
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether this generation was ever published, even if since cancelled.
    pub fn was_published(&self) -> bool {
        self.published.load(Ordering::Acquire)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// Fileset references still waiting for their first value.
    pub fn outstanding(&self) -> usize {
        match self.tracker.get() {
            Some(tracker) => tracker.outstanding(),
            None if self.fetch_started.load(Ordering::Acquire) => 0,
            None => self.snapshot.fileset_refs().len(),
        }
    }

    /// Subscriptions currently held by this generation.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Resolved direct file references.
    pub fn files(&self) -> Arc<[PathBuf]> {
        self.content.files()
    }

    /// Resolved folder references.
    pub fn folders(&self) -> Arc<[PathBuf]> {
        self.content.folders()
    }

    /// The fileset-independent content.
    pub fn content(&self) -> &ResolvedContentSet {
        &self.content
    }

    /// Known fileset values, ordered by reference id.
    pub fn filesets(&self) -> Vec<Fileset> {
        self.filesets
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .collect()
    }

    /// Latest value for one fileset reference.
    pub fn fileset(&self, ref_id: &str) -> Option<Fileset> {
        self.filesets.get(ref_id).map(|f| f.value().clone())
    }

    /// Static containers plus one container per file of every known fileset.
    ///
    /// Recomputed on every call since fileset values can change after
    /// publication. A cancelled generation only reports its static
    /// containers, so no cache directories are created after a sweep.
    pub fn containers(&self) -> Vec<Container> {
        if self.is_cancelled() {
            return self.content.containers().to_vec();
        }
        let filesets = self.filesets();
        let dynamic = filesets.iter().flat_map(|fileset| {
            fileset.files().iter().filter_map(move |file| {
                let name = format!("{}-{}", fileset.ref_id(), source_name(file));
                self.context.build_container(self.id, &name, file)
            })
        });
        self.content.containers_with(dynamic)
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("id", &self.id)
            .field("library", &self.snapshot.id())
            .field("state", &self.state())
            .field("outstanding", &self.outstanding())
            .finish_non_exhaustive()
    }
}

/// Hex digits of the path digest kept in a cache directory name.
const SOURCE_DIGEST_LEN: usize = 12;

/// Cache directory name for a source path: its file name plus a digest of
/// the full path, unique per source within a generation.
fn source_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string());

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}-{}", base, &digest[..SOURCE_DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualFilesetResolver, StaticPathResolver, StubContainerFactory};
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingListener {
        resolved: AtomicUsize,
        changed: AtomicUsize,
        resolved_ids: Mutex<Vec<GenerationId>>,
    }

    impl GenerationListener for CountingListener {
        fn generation_resolved(&self, generation: &Arc<Generation>) {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            self.resolved_ids.lock().push(generation.id());
        }

        fn generation_changed(&self, _generation: &Arc<Generation>) {
            self.changed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        resolver: Arc<ManualFilesetResolver>,
        listener: Arc<CountingListener>,
        context: Arc<GenerationContext>,
        _cache: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let cache = tempfile::tempdir().unwrap();
            let resolver = Arc::new(ManualFilesetResolver::new());
            let paths = StaticPathResolver::new()
                .with_file("api", "/libs/api.jar")
                .with_folder("classes", "/libs/classes");
            let context = Arc::new(GenerationContext::new(
                "lib",
                Arc::new(paths),
                Arc::new(StubContainerFactory::new()),
                Arc::clone(&resolver) as Arc<dyn FilesetResolver>,
                cache.path(),
            ));
            Self {
                resolver,
                listener: Arc::new(CountingListener::default()),
                context,
                _cache: cache,
            }
        }

        fn build(&self, snapshot: ConfigSnapshot) -> Arc<Generation> {
            let listener: Weak<dyn GenerationListener> =
                Arc::downgrade(&self.listener) as Weak<dyn GenerationListener>;
            Generation::build(
                GenerationId::new(1),
                Arc::new(snapshot),
                Arc::clone(&self.context),
                listener,
            )
        }

        fn resolved(&self) -> usize {
            self.listener.resolved.load(Ordering::SeqCst)
        }

        fn changed(&self) -> usize {
            self.listener.changed.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_build_drops_unresolved_references() {
        let fx = Fixture::new();
        let generation = fx.build(
            ConfigSnapshot::new("lib")
                .with_file_ref("api")
                .with_file_ref("missing")
                .with_folder_ref("classes")
                .with_folder_ref("gone"),
        );

        assert_eq!(&*generation.files(), [PathBuf::from("/libs/api.jar")]);
        assert_eq!(&*generation.folders(), [PathBuf::from("/libs/classes")]);
        assert_eq!(generation.content().containers().len(), 2);
        assert_eq!(generation.state(), GenerationState::Building);
    }

    #[test]
    fn test_no_filesets_resolves_immediately() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_file_ref("api"));

        generation.fetch_filesets();
        assert_eq!(fx.resolved(), 1);
        assert_eq!(generation.state(), GenerationState::Resolved);
        assert_eq!(fx.resolver.subscribe_calls(), 0);

        // Second fetch is a no-op
        generation.fetch_filesets();
        assert_eq!(fx.resolved(), 1);
    }

    #[test]
    fn test_resolves_once_all_filesets_delivered() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A").with_fileset_ref("B"));
        generation.fetch_filesets();
        assert_eq!(generation.subscription_count(), 2);
        assert_eq!(generation.outstanding(), 2);

        fx.resolver.deliver("B", [PathBuf::from("/fs/b1.jar")]);
        assert_eq!(fx.resolved(), 0);
        fx.resolver.deliver("A", [PathBuf::from("/fs/a1.jar")]);
        assert_eq!(fx.resolved(), 1);

        // Post-resolution value is a change, not a second resolution
        fx.resolver.deliver("B", [PathBuf::from("/fs/b2.jar")]);
        assert_eq!(fx.resolved(), 1);
        assert_eq!(fx.changed(), 1);
        assert_eq!(generation.fileset("B").unwrap().files(), [PathBuf::from("/fs/b2.jar")]);
    }

    #[test]
    fn test_duplicate_before_resolution_is_stored_silently() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A").with_fileset_ref("B"));
        generation.fetch_filesets();

        fx.resolver.deliver("A", [PathBuf::from("/fs/a1.jar")]);
        fx.resolver.deliver("A", [PathBuf::from("/fs/a2.jar")]);

        assert_eq!(generation.outstanding(), 1);
        assert_eq!(fx.changed(), 0);
        assert_eq!(fx.resolved(), 0);
        assert_eq!(generation.fileset("A").unwrap().files(), [PathBuf::from("/fs/a2.jar")]);
    }

    #[test]
    fn test_cancel_releases_every_subscription() {
        let fx = Fixture::new();
        let generation = fx.build(
            ConfigSnapshot::new("lib")
                .with_fileset_ref("A")
                .with_fileset_ref("B")
                .with_fileset_ref("C"),
        );
        generation.fetch_filesets();
        generation.cancel();
        generation.cancel();

        assert_eq!(fx.resolver.subscribe_calls(), 3);
        assert_eq!(fx.resolver.unsubscribe_calls(), 3);
        assert_eq!(fx.resolver.active_count(), 0);
        assert_eq!(generation.state(), GenerationState::Cancelled);
    }

    #[test]
    fn test_late_delivery_after_cancel_is_ignored() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A"));
        generation.fetch_filesets();
        generation.cancel();

        // A value already in flight when unsubscribe ran
        fx.resolver.deliver_including_removed("A", [PathBuf::from("/fs/a.jar")]);
        assert_eq!(fx.resolved(), 0);
        assert!(generation.fileset("A").is_none());
    }

    #[test]
    fn test_cancel_during_registration_undoes_subscription() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A").with_fileset_ref("B"));

        let target = Arc::downgrade(&generation);
        fx.resolver.on_subscribe(move |_| {
            if let Some(g) = target.upgrade() {
                g.cancel();
            }
        });
        generation.fetch_filesets();

        // The in-flight registration of A undid itself; B was never placed
        assert_eq!(fx.resolver.subscribe_calls(), 1);
        assert_eq!(fx.resolver.unsubscribe_calls(), 1);
        assert_eq!(fx.resolver.active_count(), 0);
    }

    #[test]
    fn test_resolver_shutdown_is_swallowed() {
        let fx = Fixture::new();
        fx.resolver.set_shutting_down(true);
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A"));

        generation.fetch_filesets();
        assert_eq!(generation.subscription_count(), 0);
        assert_eq!(generation.state(), GenerationState::Building);
    }

    #[test]
    fn test_synchronous_delivery_during_subscribe() {
        let fx = Fixture::new();
        fx.resolver
            .resolve_immediately(Fileset::new("A", [PathBuf::from("/fs/a.jar")]));
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("A"));

        generation.fetch_filesets();
        assert_eq!(fx.resolved(), 1);
        assert_eq!(generation.subscription_count(), 1);
    }

    #[test]
    fn test_containers_track_fileset_changes() {
        let fx = Fixture::new();
        let generation = fx.build(
            ConfigSnapshot::new("lib")
                .with_file_ref("api")
                .with_fileset_ref("A"),
        );
        generation.fetch_filesets();
        assert_eq!(generation.containers().len(), 1);

        fx.resolver.deliver("A", [PathBuf::from("/fs/a1.jar"), PathBuf::from("/fs/a2.jar")]);
        let containers = generation.containers();
        assert_eq!(containers.len(), 3);
        assert_eq!(containers[0].source(), Path::new("/libs/api.jar"));

        fx.resolver.deliver("A", [PathBuf::from("/fs/a3.jar")]);
        let sources: Vec<_> = generation
            .containers()
            .into_iter()
            .map(|c| c.source().to_path_buf())
            .collect();
        assert_eq!(sources, [PathBuf::from("/libs/api.jar"), PathBuf::from("/fs/a3.jar")]);
        // Static part is never recomputed
        assert_eq!(generation.content().containers().len(), 1);
    }

    #[test]
    fn test_same_named_sources_get_distinct_cache_dirs() {
        let fx = Fixture::new();
        let generation = fx.build(ConfigSnapshot::new("lib").with_fileset_ref("deps"));
        generation.fetch_filesets();
        fx.resolver.deliver(
            "deps",
            [PathBuf::from("/x/a/lib.jar"), PathBuf::from("/x/b/lib.jar")],
        );

        let containers = generation.containers();
        assert_eq!(containers.len(), 2);
        assert_ne!(containers[0].cache_dir(), containers[1].cache_dir());
        // Stable across recomputation
        assert_eq!(generation.containers()[0].cache_dir(), containers[0].cache_dir());
    }

    #[test]
    fn test_same_named_file_refs_get_distinct_cache_dirs() {
        let cache = tempfile::tempdir().unwrap();
        let paths = StaticPathResolver::new()
            .with_file("x", "/x/api.jar")
            .with_file("y", "/y/api.jar");
        let context = Arc::new(GenerationContext::new(
            "lib",
            Arc::new(paths),
            Arc::new(StubContainerFactory::new()),
            Arc::new(ManualFilesetResolver::new()) as Arc<dyn FilesetResolver>,
            cache.path(),
        ));
        let generation = Generation::build(
            GenerationId::new(1),
            Arc::new(ConfigSnapshot::new("lib").with_file_ref("x").with_file_ref("y")),
            context,
            Weak::<CountingListener>::new() as Weak<dyn GenerationListener>,
        );

        let containers = generation.content().containers();
        assert_eq!(containers.len(), 2);
        assert_ne!(containers[0].cache_dir(), containers[1].cache_dir());
    }

    #[test]
    fn test_cancelled_generation_builds_no_fileset_containers() {
        let fx = Fixture::new();
        let generation = fx.build(
            ConfigSnapshot::new("lib")
                .with_file_ref("api")
                .with_fileset_ref("A"),
        );
        generation.fetch_filesets();
        fx.resolver.deliver("A", [PathBuf::from("/fs/a1.jar")]);
        let dynamic_dir = generation.containers()[1].cache_dir().to_path_buf();

        generation.cancel();
        std::fs::remove_dir_all(&dynamic_dir).unwrap();

        let containers = generation.containers();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].source(), Path::new("/libs/api.jar"));
        assert!(!dynamic_dir.exists());
    }

    #[test]
    fn test_listener_gone_does_not_panic() {
        let fx = Fixture::new();
        let generation = Generation::build(
            GenerationId::new(9),
            Arc::new(ConfigSnapshot::new("lib")),
            Arc::clone(&fx.context),
            Weak::<CountingListener>::new() as Weak<dyn GenerationListener>,
        );
        generation.fetch_filesets();
        assert!(generation.is_resolved());
        assert_eq!(fx.listener.resolved_ids.lock().len(), 0);
    }
}

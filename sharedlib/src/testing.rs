//! Test doubles for the controller's collaborators.
//!
//! Used by this crate's own tests and available to downstream crates that
//! embed a [`LibraryController`](crate::controller::LibraryController).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::content::{Container, ContainerFactory, ContainerKind, Fileset, PathResolver, ARCHIVE_EXTENSIONS};
use crate::fileset::{FilesetResolver, FilesetSubscriber, ResolverError, SubscriptionHandle};
use crate::notify::{ChangeNotifier, LibraryChanged};

type SubscribeHook = Arc<dyn Fn(&str) + Send + Sync>;

struct ManualSubscription {
    handle: SubscriptionHandle,
    subscriber: Arc<dyn FilesetSubscriber>,
    active: bool,
}

/// Fileset resolver driven by the test.
///
/// Nothing is delivered until [`deliver`](Self::deliver) is called, on the
/// calling thread. Every subscribe and unsubscribe is counted.
#[derive(Default)]
pub struct ManualFilesetResolver {
    subscriptions: Mutex<Vec<ManualSubscription>>,
    immediate: Mutex<HashMap<String, Fileset>>,
    hook: Mutex<Option<SubscribeHook>>,
    next_id: AtomicU64,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
    shutting_down: AtomicBool,
}

impl ManualFilesetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `files` as the value of `ref_id` to every live subscriber.
    ///
    /// Returns the number of subscribers reached.
    pub fn deliver(&self, ref_id: &str, files: impl IntoIterator<Item = PathBuf>) -> usize {
        self.deliver_matching(Fileset::new(ref_id, files), false)
    }

    /// Like [`deliver`](Self::deliver), but also reaches subscriptions that
    /// were already removed, as a delivery in flight during unsubscribe would.
    pub fn deliver_including_removed(
        &self,
        ref_id: &str,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> usize {
        self.deliver_matching(Fileset::new(ref_id, files), true)
    }

    fn deliver_matching(&self, fileset: Fileset, include_removed: bool) -> usize {
        let targets: Vec<Arc<dyn FilesetSubscriber>> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|s| s.handle.ref_id() == fileset.ref_id() && (s.active || include_removed))
            .map(|s| Arc::clone(&s.subscriber))
            .collect();

        for subscriber in &targets {
            subscriber.on_fileset_resolved(fileset.clone());
        }
        targets.len()
    }

    /// Deliver `fileset` synchronously from within every later `subscribe`
    /// for its reference.
    pub fn resolve_immediately(&self, fileset: Fileset) {
        self.immediate
            .lock()
            .insert(fileset.ref_id().to_string(), fileset);
    }

    /// Run `hook` inside `subscribe`, after the subscription is registered
    /// and before its handle is returned.
    pub fn on_subscribe(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.hook.lock() = Some(Arc::new(hook));
    }

    /// Make every later `subscribe` fail with [`ResolverError::ShuttingDown`].
    pub fn set_shutting_down(&self, shutting_down: bool) {
        self.shutting_down.store(shutting_down, Ordering::SeqCst);
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    /// Subscriptions not yet unsubscribed.
    pub fn active_count(&self) -> usize {
        self.subscriptions.lock().iter().filter(|s| s.active).count()
    }

    /// Live subscriptions for one fileset reference.
    pub fn active_for(&self, ref_id: &str) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|s| s.active && s.handle.ref_id() == ref_id)
            .count()
    }
}

impl FilesetResolver for ManualFilesetResolver {
    fn subscribe(
        &self,
        ref_id: &str,
        subscriber: Arc<dyn FilesetSubscriber>,
    ) -> Result<SubscriptionHandle, ResolverError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(ResolverError::ShuttingDown);
        }
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);

        let handle = SubscriptionHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1, ref_id);
        self.subscriptions.lock().push(ManualSubscription {
            handle: handle.clone(),
            subscriber: Arc::clone(&subscriber),
            active: true,
        });

        let immediate = self.immediate.lock().get(ref_id).cloned();
        if let Some(fileset) = immediate {
            subscriber.on_fileset_resolved(fileset);
        }

        let hook = self.hook.lock().clone();
        if let Some(hook) = hook {
            hook(ref_id);
        }

        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        let mut subscriptions = self.subscriptions.lock();
        if let Some(s) = subscriptions.iter_mut().find(|s| s.handle == *handle) {
            s.active = false;
        }
    }
}

/// Path resolver backed by a fixed table, without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct StaticPathResolver {
    files: HashMap<String, PathBuf>,
    folders: HashMap<String, PathBuf>,
}

impl StaticPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, ref_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(ref_id.into(), path.into());
        self
    }

    pub fn with_folder(mut self, ref_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.folders.insert(ref_id.into(), path.into());
        self
    }
}

impl PathResolver for StaticPathResolver {
    fn resolve_file(&self, ref_id: &str) -> Option<PathBuf> {
        self.files.get(ref_id).cloned()
    }

    fn resolve_folder(&self, ref_id: &str) -> Option<PathBuf> {
        self.folders.get(ref_id).cloned()
    }
}

/// Container factory that classifies sources by name alone.
///
/// Sources with an archive extension become archives (their cache dir is
/// created), extensionless ones directories, anything else plain files.
/// Sources passed to [`rejecting`](Self::rejecting) yield no container.
#[derive(Debug, Default)]
pub struct StubContainerFactory {
    rejected: HashSet<PathBuf>,
    builds: AtomicUsize,
}

impl StubContainerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, source: impl Into<PathBuf>) -> Self {
        self.rejected.insert(source.into());
        self
    }

    /// Number of `build` calls so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl ContainerFactory for StubContainerFactory {
    fn build(&self, cache_dir: &Path, source: &Path) -> Option<Container> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.rejected.contains(source) {
            return None;
        }

        let kind = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) if ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)) => {
                std::fs::create_dir_all(cache_dir).ok()?;
                ContainerKind::Archive
            }
            Some(_) => ContainerKind::File,
            None => ContainerKind::Directory,
        };
        Some(Container::new(source, cache_dir, kind))
    }
}

/// Notifier that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<LibraryChanged>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn events(&self) -> Vec<LibraryChanged> {
        self.events.lock().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn library_changed(&self, event: LibraryChanged) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collecting(Mutex<Vec<Fileset>>);

    impl FilesetSubscriber for Collecting {
        fn on_fileset_resolved(&self, fileset: Fileset) {
            self.0.lock().push(fileset);
        }
    }

    #[test]
    fn test_manual_resolver_counts_and_delivers() {
        let resolver = ManualFilesetResolver::new();
        let sink = Arc::new(Collecting(Mutex::new(Vec::new())));

        let handle = resolver.subscribe("A", sink.clone()).unwrap();
        assert_eq!(resolver.deliver("A", [PathBuf::from("/a")]), 1);
        assert_eq!(resolver.deliver("B", [PathBuf::from("/b")]), 0);

        resolver.unsubscribe(&handle);
        assert_eq!(resolver.deliver("A", [PathBuf::from("/a")]), 0);
        assert_eq!(resolver.deliver_including_removed("A", [PathBuf::from("/a")]), 1);

        assert_eq!(sink.0.lock().len(), 2);
        assert_eq!(resolver.subscribe_calls(), 1);
        assert_eq!(resolver.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_stub_factory_classifies_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let factory = StubContainerFactory::new().rejecting("/x/bad.jar");

        let archive = factory.build(&dir.path().join("a"), Path::new("/x/a.jar")).unwrap();
        assert_eq!(archive.kind(), ContainerKind::Archive);
        assert!(dir.path().join("a").is_dir());

        let folder = factory.build(&dir.path().join("b"), Path::new("/x/classes")).unwrap();
        assert_eq!(folder.kind(), ContainerKind::Directory);

        assert!(factory.build(&dir.path().join("c"), Path::new("/x/bad.jar")).is_none());
        assert_eq!(factory.builds(), 3);
    }
}

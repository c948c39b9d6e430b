//! Glob fileset resolver with a bounded dispatcher.
//!
//! Subscriptions and redefinitions are queued as requests on a bounded
//! channel. A single dispatcher task drains the queue, scans the filesystem
//! on the blocking pool and delivers a [`ResolutionEvent`] to each affected
//! subscriber.
//!
//! ```text
//! subscribe() / define() ──try_send──► [ bounded queue ] ──► dispatcher task
//!                                                              │ spawn_blocking(scan)
//!                                                              ▼
//!                                              subscriber.on_fileset_resolved()
//! ```
//!
//! Registration never blocks: a full queue is reported as
//! [`ResolverError::QueueFull`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{FilesetDefinition, FilesetResolver, FilesetSubscriber, ResolverError, SubscriptionHandle};
use crate::content::Fileset;

/// Default request queue capacity.
pub const DEFAULT_DISPATCH_CAPACITY: usize = 256;

/// One resolved value addressed to one subscription.
#[derive(Debug, Clone)]
pub struct ResolutionEvent {
    pub handle: SubscriptionHandle,
    pub fileset: Fileset,
}

#[derive(Debug)]
enum ResolutionRequest {
    /// A new subscription wants its first value.
    Subscribed(SubscriptionHandle),
    /// A definition changed; every subscriber of the id gets a new value.
    Redefined(String),
}

struct Subscription {
    ref_id: String,
    subscriber: Arc<dyn FilesetSubscriber>,
}

struct ResolverState {
    definitions: DashMap<String, FilesetDefinition>,
    subscriptions: DashMap<u64, Subscription>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

impl ResolverState {
    fn deliver(&self, event: ResolutionEvent) {
        // Clone out of the map so the shard lock is released before the
        // callback runs; subscribers may unsubscribe re-entrantly.
        let subscriber = self
            .subscriptions
            .get(&event.handle.id())
            .map(|s| Arc::clone(&s.subscriber));

        match subscriber {
            Some(subscriber) => subscriber.on_fileset_resolved(event.fileset),
            None => debug!(
                fileset = event.handle.ref_id(),
                subscription = event.handle.id(),
                "Dropping resolution for removed subscription"
            ),
        }
    }
}

/// A [`FilesetResolver`] backed by [`FilesetDefinition`] glob scans.
///
/// Cheap to clone; all clones share the same dispatcher.
#[derive(Clone)]
pub struct GlobFilesetResolver {
    state: Arc<ResolverState>,
    requests: mpsc::Sender<ResolutionRequest>,
}

impl std::fmt::Debug for GlobFilesetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobFilesetResolver")
            .field("definitions", &self.state.definitions.len())
            .field("subscriptions", &self.state.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl GlobFilesetResolver {
    /// Start the resolver's dispatcher task on `runtime`.
    ///
    /// The returned join handle completes after [`shutdown`](Self::shutdown).
    pub fn start(runtime: &Handle, capacity: usize) -> (Self, JoinHandle<()>) {
        let (requests, rx) = mpsc::channel(capacity.max(1));
        let state = Arc::new(ResolverState {
            definitions: DashMap::new(),
            subscriptions: DashMap::new(),
            next_id: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        });

        let task = runtime.spawn(dispatch_loop(Arc::clone(&state), rx));
        (Self { state, requests }, task)
    }

    /// Add or replace a fileset definition.
    ///
    /// Live subscribers of `ref_id` receive a freshly scanned value.
    pub fn define(
        &self,
        ref_id: impl Into<String>,
        definition: FilesetDefinition,
    ) -> Result<(), ResolverError> {
        if self.state.shutdown.is_cancelled() {
            return Err(ResolverError::ShuttingDown);
        }
        let ref_id = ref_id.into();
        self.state.definitions.insert(ref_id.clone(), definition);
        self.refresh(&ref_id)
    }

    /// Rescan `ref_id` and re-deliver to its live subscribers.
    pub fn refresh(&self, ref_id: &str) -> Result<(), ResolverError> {
        let has_subscribers = self
            .state
            .subscriptions
            .iter()
            .any(|s| s.ref_id == ref_id);
        if !has_subscribers {
            return Ok(());
        }
        self.enqueue(ResolutionRequest::Redefined(ref_id.to_string()), ref_id)
    }

    /// Forget a definition. Existing subscribers keep their last value.
    pub fn remove(&self, ref_id: &str) -> Option<FilesetDefinition> {
        self.state.definitions.remove(ref_id).map(|(_, d)| d)
    }

    /// Stop the dispatcher. Later subscriptions fail with
    /// [`ResolverError::ShuttingDown`].
    pub fn shutdown(&self) {
        debug!("Fileset resolver shutting down");
        self.state.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.shutdown.is_cancelled()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state.subscriptions.len()
    }

    fn enqueue(&self, request: ResolutionRequest, ref_id: &str) -> Result<(), ResolverError> {
        match self.requests.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(fileset = ref_id, "Fileset resolver queue full");
                Err(ResolverError::QueueFull {
                    ref_id: ref_id.to_string(),
                })
            }
            Err(TrySendError::Closed(_)) => Err(ResolverError::ShuttingDown),
        }
    }
}

impl FilesetResolver for GlobFilesetResolver {
    fn subscribe(
        &self,
        ref_id: &str,
        subscriber: Arc<dyn FilesetSubscriber>,
    ) -> Result<SubscriptionHandle, ResolverError> {
        if self.state.shutdown.is_cancelled() {
            return Err(ResolverError::ShuttingDown);
        }

        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = SubscriptionHandle::new(id, ref_id);
        self.state.subscriptions.insert(
            id,
            Subscription {
                ref_id: ref_id.to_string(),
                subscriber,
            },
        );

        if let Err(e) = self.enqueue(ResolutionRequest::Subscribed(handle.clone()), ref_id) {
            self.state.subscriptions.remove(&id);
            return Err(e);
        }

        debug!(fileset = ref_id, subscription = id, "Fileset subscription registered");
        Ok(handle)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        if self.state.subscriptions.remove(&handle.id()).is_some() {
            debug!(
                fileset = handle.ref_id(),
                subscription = handle.id(),
                "Fileset subscription removed"
            );
        }
    }
}

async fn dispatch_loop(state: Arc<ResolverState>, mut rx: mpsc::Receiver<ResolutionRequest>) {
    loop {
        let request = tokio::select! {
            _ = state.shutdown.cancelled() => break,
            request = rx.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let ref_id = match &request {
            ResolutionRequest::Subscribed(handle) => handle.ref_id().to_string(),
            ResolutionRequest::Redefined(ref_id) => ref_id.clone(),
        };

        let Some(definition) = state.definitions.get(&ref_id).map(|d| d.value().clone()) else {
            debug!(fileset = %ref_id, "No definition yet, deferring resolution");
            continue;
        };

        let scan_id = ref_id.clone();
        let fileset = match tokio::task::spawn_blocking(move || definition.resolve(&scan_id)).await {
            Ok(fileset) => fileset,
            Err(e) => {
                warn!(fileset = %ref_id, error = %e, "Fileset scan failed");
                continue;
            }
        };

        let events: Vec<ResolutionEvent> = match request {
            ResolutionRequest::Subscribed(handle) => vec![ResolutionEvent { handle, fileset }],
            ResolutionRequest::Redefined(_) => state
                .subscriptions
                .iter()
                .filter(|s| s.ref_id == ref_id)
                .map(|s| ResolutionEvent {
                    handle: SubscriptionHandle::new(*s.key(), &ref_id),
                    fileset: fileset.clone(),
                })
                .collect(),
        };

        debug!(fileset = %ref_id, deliveries = events.len(), "Delivering fileset resolution");
        for event in events {
            state.deliver(event);
        }
    }

    debug!("Fileset dispatcher stopped");
}

//! Asynchronous fileset resolution.
//!
//! Fileset membership is owned by an external [`FilesetResolver`]. A
//! generation subscribes once per fileset reference and is told about every
//! resolved value through [`FilesetSubscriber::on_fileset_resolved`].
//!
//! # Delivery contract
//!
//! - zero or more deliveries per subscription, at least one eventually if the
//!   fileset exists
//! - deliveries may be duplicated and arrive on any thread, in any order
//!   relative to other subscriptions
//! - after [`FilesetResolver::unsubscribe`] returns, no new delivery starts
//!   for that handle (one already in flight may still complete)
//!
//! [`FilesetResolutionTracker`] turns those deliveries into a single
//! "fully resolved" event per generation.

mod definition;
mod dispatch;
mod tracker;

use std::sync::Arc;

use thiserror::Error;

use crate::content::Fileset;

pub use definition::FilesetDefinition;
pub use dispatch::{GlobFilesetResolver, ResolutionEvent, DEFAULT_DISPATCH_CAPACITY};
pub use tracker::{FilesetResolutionTracker, NotificationOutcome};

/// Errors returned by [`FilesetResolver::subscribe`].
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver is shutting down and accepts no new subscriptions.
    #[error("Fileset resolver is shutting down")]
    ShuttingDown,

    /// The resolver's request queue is full.
    #[error("Fileset resolver queue is full (fileset '{ref_id}')")]
    QueueFull { ref_id: String },
}

impl ResolverError {
    /// Whether this error is expected during platform shutdown.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, ResolverError::ShuttingDown)
    }
}

/// Opaque handle for one fileset subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    ref_id: String,
}

impl SubscriptionHandle {
    pub fn new(id: u64, ref_id: impl Into<String>) -> Self {
        Self {
            id,
            ref_id: ref_id.into(),
        }
    }

    /// Resolver-assigned subscription id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The fileset reference this subscription watches.
    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }
}

/// Receives resolved fileset values.
pub trait FilesetSubscriber: Send + Sync {
    /// Called with each resolved value, possibly more than once.
    fn on_fileset_resolved(&self, fileset: Fileset);
}

/// External service that resolves fileset membership.
pub trait FilesetResolver: Send + Sync {
    /// Start watching `ref_id` on behalf of `subscriber`.
    ///
    /// Registration is fire-and-forget: the first value arrives later through
    /// the subscriber. Implementations may deliver synchronously from inside
    /// this call.
    fn subscribe(
        &self,
        ref_id: &str,
        subscriber: Arc<dyn FilesetSubscriber>,
    ) -> Result<SubscriptionHandle, ResolverError>;

    /// Stop watching. Unknown or already removed handles are ignored.
    fn unsubscribe(&self, handle: &SubscriptionHandle);
}

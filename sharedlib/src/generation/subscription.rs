//! Per-generation fileset subscriptions.

use std::sync::Weak;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::Generation;
use crate::content::Fileset;
use crate::fileset::{FilesetSubscriber, SubscriptionHandle};

/// Routes deliveries for one fileset reference to the generation that asked.
///
/// Holds the generation weakly: once the controller lets go of a generation
/// its subscriptions become inert even if the resolver still holds them.
pub(crate) struct FilesetSubscription {
    ref_id: String,
    generation: Weak<Generation>,
}

impl FilesetSubscription {
    pub(crate) fn new(ref_id: impl Into<String>, generation: Weak<Generation>) -> Self {
        Self {
            ref_id: ref_id.into(),
            generation,
        }
    }
}

impl FilesetSubscriber for FilesetSubscription {
    fn on_fileset_resolved(&self, fileset: Fileset) {
        if let Some(generation) = self.generation.upgrade() {
            generation.on_fileset_resolved(&self.ref_id, fileset);
        }
    }
}

/// Handles owned by one generation.
///
/// Insertion checks the cancellation token under the registry lock, and
/// cancellation sets the token before draining under the same lock. A handle
/// is therefore either drained by `cancel` or refused by `insert`, never
/// both and never neither.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl SubscriptionRegistry {
    /// Keep `handle`, unless the generation is already cancelled, in which
    /// case it is handed back for the caller to unsubscribe.
    pub(crate) fn insert(
        &self,
        handle: SubscriptionHandle,
        cancel: &CancellationToken,
    ) -> Result<(), SubscriptionHandle> {
        let mut handles = self.handles.lock();
        if cancel.is_cancelled() {
            return Err(handle);
        }
        handles.push(handle);
        Ok(())
    }

    /// Take every handle registered so far.
    pub(crate) fn drain(&self) -> Vec<SubscriptionHandle> {
        std::mem::take(&mut *self.handles.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.lock().len()
    }
}

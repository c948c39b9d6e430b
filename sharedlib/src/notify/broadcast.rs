//! Change notification over a tokio broadcast channel.

use tokio::sync::broadcast;
use tracing::trace;

use super::{ChangeNotifier, LibraryChanged};

/// Default broadcast buffer. Slow receivers beyond this lag and skip events.
pub const DEFAULT_NOTIFY_CAPACITY: usize = 64;

/// Fans [`LibraryChanged`] events out to any number of receivers.
///
/// Sending never blocks. With no receivers the event is dropped.
///
/// ```
/// use sharedlib::notify::{BroadcastNotifier, ChangeNotifier, LibraryChanged};
/// use sharedlib::GenerationId;
///
/// let notifier = BroadcastNotifier::default();
/// let mut rx = notifier.subscribe();
///
/// notifier.library_changed(LibraryChanged {
///     library_id: "lib".into(),
///     generation: GenerationId::new(1),
/// });
/// assert_eq!(rx.try_recv().unwrap().library_id, "lib");
/// ```
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<LibraryChanged>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// A new receiver that sees every event sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryChanged> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_CAPACITY)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn library_changed(&self, event: LibraryChanged) {
        if self.tx.send(event).is_err() {
            trace!("No change receivers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationId;

    fn event(generation: u64) -> LibraryChanged {
        LibraryChanged {
            library_id: "lib".to_string(),
            generation: GenerationId::new(generation),
        }
    }

    #[test]
    fn test_send_without_receivers_is_dropped() {
        let notifier = BroadcastNotifier::new(4);
        notifier.library_changed(event(1));
        assert_eq!(notifier.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_every_receiver_sees_events_in_order() {
        let notifier = BroadcastNotifier::new(4);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.library_changed(event(1));
        notifier.library_changed(event(2));

        assert_eq!(a.recv().await.unwrap().generation, GenerationId::new(1));
        assert_eq!(a.recv().await.unwrap().generation, GenerationId::new(2));
        assert_eq!(b.recv().await.unwrap().generation, GenerationId::new(1));
    }

    #[tokio::test]
    async fn test_slow_receiver_lags() {
        let notifier = BroadcastNotifier::new(1);
        let mut rx = notifier.subscribe();

        notifier.library_changed(event(1));
        notifier.library_changed(event(2));

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().generation, GenerationId::new(2));
    }
}

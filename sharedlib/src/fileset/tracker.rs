//! Exactly-once completion for N unordered fileset deliveries.
//!
//! # Algorithm
//!
//! The tracker is seeded with every fileset id *before* any subscription is
//! placed, so a delivery can never race ahead of its own bookkeeping.
//!
//! ```text
//! record(id):
//!   count == 0          -> steady state: apply, report Updated
//!   remove(id) fails    -> duplicate:    apply, report Duplicate
//!   remove(id) succeeds -> apply, count -= 1
//!                          count hit 0 -> Completed (this caller only)
//!                          otherwise   -> Recorded
//! ```
//!
//! Removal from the concurrent set is the only point where a delivery
//! "claims" an id, so the decrement happens at most once per id and exactly
//! one caller observes the transition to zero, regardless of arrival order.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashSet;
use tracing::error;

/// What a single delivery did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// First value for an id; other ids are still outstanding.
    Recorded,
    /// First value for the last outstanding id. Reported exactly once.
    Completed,
    /// A value arriving after completion.
    Updated,
    /// A repeat value during initial resolution.
    Duplicate,
}

/// Counts outstanding fileset ids down to zero.
#[derive(Debug)]
pub struct FilesetResolutionTracker {
    outstanding_ids: DashSet<String>,
    outstanding_count: AtomicUsize,
    total: usize,
}

impl FilesetResolutionTracker {
    /// Create a tracker with every id outstanding. Repeated ids count once.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let outstanding_ids = DashSet::new();
        for id in ids {
            outstanding_ids.insert(id.into());
        }
        let total = outstanding_ids.len();

        Self {
            outstanding_ids,
            outstanding_count: AtomicUsize::new(total),
            total,
        }
    }

    /// Record a delivery for `id`.
    ///
    /// `apply` stores the delivered value and is always invoked, before the
    /// outstanding count is decremented, so whoever sees
    /// [`NotificationOutcome::Completed`] also sees every stored value.
    pub fn record(&self, id: &str, apply: impl FnOnce()) -> NotificationOutcome {
        if self.outstanding_count.load(Ordering::Acquire) == 0 {
            apply();
            return NotificationOutcome::Updated;
        }

        if self.outstanding_ids.remove(id).is_none() {
            apply();
            return NotificationOutcome::Duplicate;
        }

        apply();
        match self
            .outstanding_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => NotificationOutcome::Completed,
            Ok(_) => NotificationOutcome::Recorded,
            Err(_) => {
                // An id was claimed with nothing left to count.
                debug_assert!(false, "outstanding fileset count underflow on '{id}'");
                error!(fileset = id, "Outstanding fileset count underflow");
                NotificationOutcome::Duplicate
            }
        }
    }

    /// Number of ids still waiting for their first value.
    pub fn outstanding(&self) -> usize {
        self.outstanding_count.load(Ordering::Acquire)
    }

    /// Whether `id` is still waiting for its first value.
    pub fn is_outstanding(&self, id: &str) -> bool {
        self.outstanding_ids.contains(id)
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    /// Number of distinct ids the tracker was seeded with.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_counts_down_to_completion() {
        let tracker = FilesetResolutionTracker::new(["A", "B"]);
        assert_eq!(tracker.outstanding(), 2);

        assert_eq!(tracker.record("B", || {}), NotificationOutcome::Recorded);
        assert!(!tracker.is_outstanding("B"));
        assert!(tracker.is_outstanding("A"));

        assert_eq!(tracker.record("A", || {}), NotificationOutcome::Completed);
        assert!(tracker.is_complete());

        assert_eq!(tracker.record("B", || {}), NotificationOutcome::Updated);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_duplicate_before_completion_does_not_count() {
        let tracker = FilesetResolutionTracker::new(["A", "B"]);
        assert_eq!(tracker.record("A", || {}), NotificationOutcome::Recorded);
        assert_eq!(tracker.record("A", || {}), NotificationOutcome::Duplicate);
        assert_eq!(tracker.outstanding(), 1);
        assert_eq!(tracker.record("B", || {}), NotificationOutcome::Completed);
    }

    #[test]
    fn test_apply_runs_for_every_outcome() {
        let tracker = FilesetResolutionTracker::new(["A", "B"]);
        let applied = AtomicUsize::new(0);
        let apply = || {
            applied.fetch_add(1, Ordering::SeqCst);
        };

        tracker.record("A", apply);
        tracker.record("A", apply);
        tracker.record("B", apply);
        tracker.record("B", apply);
        assert_eq!(applied.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_unknown_id_is_treated_as_duplicate() {
        let tracker = FilesetResolutionTracker::new(["A"]);
        assert_eq!(tracker.record("Z", || {}), NotificationOutcome::Duplicate);
        assert_eq!(tracker.outstanding(), 1);
    }

    #[test]
    fn test_repeated_seed_ids_count_once() {
        let tracker = FilesetResolutionTracker::new(["A", "A", "B"]);
        assert_eq!(tracker.total(), 2);
        assert_eq!(tracker.outstanding(), 2);
    }

    #[test]
    fn test_concurrent_deliveries_complete_once() {
        let ids: Vec<String> = (0..16).map(|i| format!("fs-{i}")).collect();
        let tracker = FilesetResolutionTracker::new(ids.iter().cloned());
        let completions = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for t in 0..8 {
                let ids = &ids;
                let tracker = &tracker;
                let completions = &completions;
                scope.spawn(move || {
                    // Every thread delivers every id, starting at a different offset
                    for i in 0..ids.len() {
                        let id = &ids[(i + t * 3) % ids.len()];
                        if tracker.record(id, || {}) == NotificationOutcome::Completed {
                            completions.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// `n` ids plus random duplicates, in random order.
        fn delivery_sequence() -> impl Strategy<Value = (usize, Vec<usize>)> {
            (1usize..8).prop_flat_map(|n| {
                proptest::collection::vec(0..n, 0..2 * n)
                    .prop_map(move |extra| {
                        let mut seq: Vec<usize> = (0..n).collect();
                        seq.extend(extra);
                        seq
                    })
                    .prop_shuffle()
                    .prop_map(move |seq| (n, seq))
            })
        }

        proptest! {
            #[test]
            fn prop_completes_exactly_once_when_all_seen((n, seq) in delivery_sequence()) {
                let tracker = FilesetResolutionTracker::new((0..n).map(|i| i.to_string()));
                let mut seen = HashSet::new();
                let mut completions = 0;

                for id in &seq {
                    let first = seen.insert(*id);
                    let outcome = tracker.record(&id.to_string(), || {});

                    if outcome == NotificationOutcome::Completed {
                        completions += 1;
                        prop_assert_eq!(seen.len(), n);
                        prop_assert!(first);
                    }
                    if seen.len() < n {
                        prop_assert!(outcome != NotificationOutcome::Updated);
                        prop_assert!(tracker.outstanding() > 0);
                    }
                }

                prop_assert_eq!(completions, 1);
                prop_assert_eq!(tracker.outstanding(), 0);
            }
        }
    }
}

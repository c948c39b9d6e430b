//! Generation identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic identifier of one generation of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GenerationId(u64);

impl GenerationId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Resource-scoped source of generation ids.
///
/// Each controller owns its own clock, so ids are only comparable within one
/// library resource.
#[derive(Debug, Default)]
pub struct GenerationClock {
    last: AtomicU64,
}

impl GenerationClock {
    /// A clock whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            last: AtomicU64::new(first.saturating_sub(1)),
        }
    }

    /// Returns the next generation id.
    pub fn next(&self) -> GenerationId {
        GenerationId(self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
    }
}

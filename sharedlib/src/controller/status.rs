//! Point-in-time controller status.

use std::fmt;

use serde::Serialize;

use crate::generation::GenerationId;

/// Which generation slots are occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerState {
    /// Nothing built yet.
    Empty,
    /// A first generation is resolving; readers see nothing.
    Building,
    /// A generation is published and nothing is resolving.
    Published,
    /// A generation is published and its successor is resolving.
    PublishedAndBuilding,
    /// The library was deleted. Terminal.
    Deleted,
}

impl ControllerState {
    pub(crate) fn from_slots(deleted: bool, has_current: bool, has_next: bool) -> Self {
        match (deleted, has_current, has_next) {
            (true, _, _) => Self::Deleted,
            (false, false, false) => Self::Empty,
            (false, false, true) => Self::Building,
            (false, true, false) => Self::Published,
            (false, true, true) => Self::PublishedAndBuilding,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Building => "building",
            Self::Published => "published",
            Self::PublishedAndBuilding => "published, building",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Snapshot of a controller's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerStatus {
    pub state: ControllerState,
    pub current_generation: Option<GenerationId>,
    pub next_generation: Option<GenerationId>,
    /// Filesets the next generation is still waiting on.
    pub outstanding: usize,
}

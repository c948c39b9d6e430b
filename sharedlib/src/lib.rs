//! sharedlib - Generation-managed shared library resources
//!
//! A shared library aggregates files, folders and externally resolved
//! filesets into a set of content containers. Filesets resolve
//! asynchronously, so every configuration update builds a new
//! [`Generation`](generation::Generation) which only becomes visible once it
//! is fully resolved.
//!
//! # Architecture
//!
//! ```text
//! ConfigSnapshot ──update()──► LibraryController
//!                                │  slots: { current, next }
//!                                ▼
//!                             Generation ──subscribe──► FilesetResolver
//!                                ▲                          │
//!                                └── FilesetResolutionTracker ◄── on_fileset_resolved
//!                                          │ count reaches zero
//!                                          ▼
//!                                publish(): current ← next
//!                                          │
//!                                          ▼
//!                              LibraryListing + ChangeNotifier
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sharedlib::config::ConfigSnapshot;
//! use sharedlib::controller::{Collaborators, ControllerConfig, LibraryController};
//!
//! let controller = LibraryController::new("lib-1", Collaborators::new(resolver), ControllerConfig::default());
//! controller.update(ConfigSnapshot::new("lib-1").with_fileset_ref("deps"));
//!
//! // Readers see nothing until every fileset has resolved.
//! assert!(controller.files().is_none());
//! ```

pub mod config;
pub mod content;
pub mod controller;
pub mod fileset;
pub mod generation;
pub mod logging;
pub mod notify;
pub mod testing;

pub use config::{ApiType, ApiVisibility, ConfigError, ConfigSnapshot};
pub use content::{Container, ContainerFactory, ContainerKind, Fileset, ResolvedContentSet};
pub use controller::{Collaborators, ControllerConfig, ControllerState, ControllerStatus, LibraryController};
pub use fileset::{FilesetResolver, FilesetSubscriber, ResolverError, SubscriptionHandle};
pub use generation::{Generation, GenerationClock, GenerationId, GenerationListener, GenerationState};
pub use logging::{init_logging, LoggingConfig, LoggingError, LoggingGuard};
pub use notify::{BroadcastNotifier, ChangeNotifier, InMemoryListing, LibraryChanged, LibraryListing, ListingEntry};

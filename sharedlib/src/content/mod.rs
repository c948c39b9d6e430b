//! Resolved library content.
//!
//! This module holds the value types a generation is made of and the
//! synchronous collaborators used to produce them:
//!
//! - [`PathResolver`] - turns file/folder reference ids into paths
//! - [`ContainerFactory`] - turns a path into a content [`Container`]
//! - [`CacheLayout`] - scratch directories keyed by resource, generation and source

mod cache_dir;
mod container;
mod fileset;
mod paths;
mod resolved;

pub use cache_dir::{CacheDirError, CacheLayout};
pub use container::{Container, ContainerFactory, ContainerKind, FsContainerFactory, ARCHIVE_EXTENSIONS};
pub use fileset::Fileset;
pub use paths::{FsPathResolver, PathResolver};
pub use resolved::ResolvedContentSet;

//! Content containers.
//!
//! A [`Container`] is the unit handed to loaders: one directory, archive or
//! plain file, together with the scratch directory reserved for it. Building
//! containers is delegated to a [`ContainerFactory`] so the generation logic
//! never touches archive formats itself.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// File extensions treated as archives by [`FsContainerFactory`].
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip", "war", "rar", "ear"];

/// What kind of source backs a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// A directory tree.
    Directory,
    /// An archive file, expanded into the cache directory on demand.
    Archive,
    /// A single non-archive file.
    File,
}

/// A content container derived from one source path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Container {
    source: PathBuf,
    cache_dir: PathBuf,
    kind: ContainerKind,
}

impl Container {
    pub fn new(source: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>, kind: ContainerKind) -> Self {
        Self {
            source: source.into(),
            cache_dir: cache_dir.into(),
            kind,
        }
    }

    /// The path this container was built from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Scratch directory reserved for this container.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }
}

/// Builds content containers from source paths.
///
/// Implementations must be synchronous and side-effect free apart from
/// preparing `cache_dir`. Returning `None` is not an error: the source is
/// simply left out of the library.
pub trait ContainerFactory: Send + Sync {
    /// Build a container for `source` using `cache_dir` as scratch space.
    fn build(&self, cache_dir: &Path, source: &Path) -> Option<Container>;
}

/// Filesystem-backed container factory.
///
/// Classifies sources by file type and extension. Archive sources get their
/// cache directory created up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContainerFactory;

impl FsContainerFactory {
    pub fn new() -> Self {
        Self
    }

    fn is_archive(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

impl ContainerFactory for FsContainerFactory {
    fn build(&self, cache_dir: &Path, source: &Path) -> Option<Container> {
        let metadata = match std::fs::metadata(source) {
            Ok(m) => m,
            Err(e) => {
                debug!(source = %source.display(), error = %e, "Container source unavailable");
                return None;
            }
        };

        let kind = if metadata.is_dir() {
            ContainerKind::Directory
        } else if Self::is_archive(source) {
            if let Err(e) = std::fs::create_dir_all(cache_dir) {
                warn!(
                    source = %source.display(),
                    cache_dir = %cache_dir.display(),
                    error = %e,
                    "Failed to prepare archive cache directory"
                );
                return None;
            }
            ContainerKind::Archive
        } else {
            ContainerKind::File
        };

        Some(Container::new(source, cache_dir, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_factory_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let container = FsContainerFactory.build(&cache, dir.path()).unwrap();
        assert_eq!(container.kind(), ContainerKind::Directory);
        assert_eq!(container.source(), dir.path());
        // Directories do not need scratch space up front
        assert!(!cache.exists());
    }

    #[test]
    fn test_fs_factory_archive_prepares_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib.JAR");
        std::fs::write(&jar, b"PK").unwrap();
        let cache = dir.path().join("cache").join("lib.JAR");

        let container = FsContainerFactory.build(&cache, &jar).unwrap();
        assert_eq!(container.kind(), ContainerKind::Archive);
        assert!(cache.is_dir());
    }

    #[test]
    fn test_fs_factory_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"hi").unwrap();

        let container = FsContainerFactory.build(dir.path(), &file).unwrap();
        assert_eq!(container.kind(), ContainerKind::File);
    }

    #[test]
    fn test_fs_factory_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsContainerFactory
            .build(dir.path(), &dir.path().join("missing.jar"))
            .is_none());
    }
}

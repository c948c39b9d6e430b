//! On-disk scratch directories.
//!
//! Layout: `<root>/<resource>/<generation>/<source>`. Each generation gets a
//! fresh directory; the whole resource directory is swept when the library
//! is deleted.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::generation::GenerationId;

/// Errors from cache directory maintenance.
#[derive(Debug, Error)]
pub enum CacheDirError {
    #[error("Failed to reset {}: {source}", path.display())]
    Reset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to sweep {}: {source}", path.display())]
    Sweep {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Cache directory layout for one library resource.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
    resource_id: String,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>, resource_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            resource_id: resource_id.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every generation of this resource.
    pub fn resource_dir(&self) -> PathBuf {
        self.root.join(sanitize(&self.resource_id))
    }

    pub fn generation_dir(&self, generation: GenerationId) -> PathBuf {
        self.resource_dir().join(generation.value().to_string())
    }

    /// Scratch directory for one source within a generation.
    pub fn source_dir(&self, generation: GenerationId, source_name: &str) -> PathBuf {
        self.generation_dir(generation).join(sanitize(source_name))
    }

    /// Remove any leftover directory for `generation`.
    ///
    /// The directory itself is created lazily by the container factory.
    pub fn reset_generation(&self, generation: GenerationId) -> Result<(), CacheDirError> {
        let path = self.generation_dir(generation);
        remove_dir(&path).map_err(|source| CacheDirError::Reset { path, source })
    }

    /// Remove the whole resource directory.
    pub fn sweep(&self) -> Result<(), CacheDirError> {
        let path = self.resource_dir();
        debug!(path = %path.display(), "Sweeping library cache directory");
        remove_dir(&path).map_err(|source| CacheDirError::Sweep { path, source })
    }
}

fn remove_dir(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Make a name safe to use as a single path component.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".repeat(cleaned.len().max(1)),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = CacheLayout::new("/cache", "lib/one");
        let generation = GenerationId::new(7);

        assert_eq!(layout.resource_dir(), PathBuf::from("/cache/lib_one"));
        assert_eq!(layout.generation_dir(generation), PathBuf::from("/cache/lib_one/7"));
        assert_eq!(
            layout.source_dir(generation, "api.jar"),
            PathBuf::from("/cache/lib_one/7/api.jar")
        );
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize(".."), "__");
        assert_eq!(sanitize("."), "_");
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("../etc"), ".._etc");
    }

    #[test]
    fn test_reset_and_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CacheLayout::new(dir.path(), "lib");
        let generation = GenerationId::new(1);

        let stale = layout.source_dir(generation, "old.jar");
        std::fs::create_dir_all(&stale).unwrap();
        layout.reset_generation(generation).unwrap();
        assert!(!layout.generation_dir(generation).exists());

        std::fs::create_dir_all(layout.source_dir(GenerationId::new(2), "a")).unwrap();
        layout.sweep().unwrap();
        assert!(!layout.resource_dir().exists());

        // Sweeping twice is fine
        layout.sweep().unwrap();
    }
}

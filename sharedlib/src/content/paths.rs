//! File and folder reference resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolves direct file and folder references to paths.
///
/// Called synchronously while a generation is constructed. `None` means the
/// reference is missing or points at the wrong kind of entry; the generation
/// drops it and carries on.
pub trait PathResolver: Send + Sync {
    /// Resolve a file reference id.
    fn resolve_file(&self, ref_id: &str) -> Option<PathBuf>;

    /// Resolve a folder reference id.
    fn resolve_folder(&self, ref_id: &str) -> Option<PathBuf>;
}

/// Table-driven resolver that validates entries against the filesystem.
///
/// A file reference resolves only if its path exists and is a regular file;
/// a folder reference only if its path is a directory.
#[derive(Debug, Clone, Default)]
pub struct FsPathResolver {
    files: HashMap<String, PathBuf>,
    folders: HashMap<String, PathBuf>,
}

impl FsPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file reference.
    pub fn with_file(mut self, ref_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(ref_id.into(), path.into());
        self
    }

    /// Register a folder reference.
    pub fn with_folder(mut self, ref_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.folders.insert(ref_id.into(), path.into());
        self
    }

    /// Configured path for a file reference, without checking the filesystem.
    pub fn file_path(&self, ref_id: &str) -> Option<&Path> {
        self.files.get(ref_id).map(PathBuf::as_path)
    }

    /// Configured path for a folder reference, without checking the filesystem.
    pub fn folder_path(&self, ref_id: &str) -> Option<&Path> {
        self.folders.get(ref_id).map(PathBuf::as_path)
    }
}

impl PathResolver for FsPathResolver {
    fn resolve_file(&self, ref_id: &str) -> Option<PathBuf> {
        let path = self.files.get(ref_id)?;
        if path.is_file() {
            Some(path.clone())
        } else {
            debug!(reference = ref_id, path = %path.display(), "File reference is not a file");
            None
        }
    }

    fn resolve_folder(&self, ref_id: &str) -> Option<PathBuf> {
        let path = self.folders.get(ref_id)?;
        if path.is_dir() {
            Some(path.clone())
        } else {
            debug!(reference = ref_id, path = %path.display(), "Folder reference is not a directory");
            None
        }
    }
}

//! Controller configuration.

use std::path::PathBuf;

/// Directory under the platform cache dir holding per-library scratch space.
pub const CACHE_DIR_NAME: &str = "sharedlib";

/// Configuration for a [`LibraryController`](super::LibraryController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Root of the scratch directory tree.
    ///
    /// Each library gets `<cache_root>/<resource_id>`, with one
    /// subdirectory per generation.
    pub cache_root: PathBuf,

    /// Remove the library's scratch directory when it is deleted.
    pub sweep_on_delete: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            sweep_on_delete: true,
        }
    }
}

impl ControllerConfig {
    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn with_sweep_on_delete(mut self, sweep: bool) -> Self {
        self.sweep_on_delete = sweep;
        self
    }
}

/// `~/.cache/sharedlib` or the platform equivalent, else the temp dir.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR_NAME)
}

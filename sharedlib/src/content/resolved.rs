//! The resolved, fileset-independent part of a generation.

use std::path::PathBuf;
use std::sync::Arc;

use super::Container;

/// Resolved file and folder paths plus the containers derived from them.
///
/// Immutable once built. Accessors hand out shared slices, so snapshots are
/// cheap to clone and safe to keep after the owning generation is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContentSet {
    files: Arc<[PathBuf]>,
    folders: Arc<[PathBuf]>,
    containers: Arc<[Container]>,
}

impl ResolvedContentSet {
    pub fn new(
        files: impl IntoIterator<Item = PathBuf>,
        folders: impl IntoIterator<Item = PathBuf>,
        containers: impl IntoIterator<Item = Container>,
    ) -> Self {
        Self {
            files: files.into_iter().collect(),
            folders: folders.into_iter().collect(),
            containers: containers.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<PathBuf>::new(), Vec::<PathBuf>::new(), Vec::<Container>::new())
    }

    pub fn files(&self) -> Arc<[PathBuf]> {
        Arc::clone(&self.files)
    }

    pub fn folders(&self) -> Arc<[PathBuf]> {
        Arc::clone(&self.folders)
    }

    /// Containers for the direct file and folder references.
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Static containers followed by `extra`.
    pub fn containers_with(&self, extra: impl IntoIterator<Item = Container>) -> Vec<Container> {
        self.containers.iter().cloned().chain(extra).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty() && self.containers.is_empty()
    }
}

impl Default for ResolvedContentSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContainerKind;

    #[test]
    fn test_containers_with_appends_after_static() {
        let set = ResolvedContentSet::new(
            [PathBuf::from("a.jar")],
            Vec::<PathBuf>::new(),
            [Container::new("a.jar", "/cache/a", ContainerKind::Archive)],
        );
        let extra = Container::new("b.jar", "/cache/b", ContainerKind::Archive);

        let all = set.containers_with([extra.clone()]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].source(), std::path::Path::new("a.jar"));
        assert_eq!(all[1], extra);
        // Static containers are untouched
        assert_eq!(set.containers().len(), 1);
    }

    #[test]
    fn test_empty() {
        assert!(ResolvedContentSet::empty().is_empty());
    }
}

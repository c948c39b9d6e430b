//! Resolved fileset values.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// The resolved membership of one fileset reference.
///
/// Values are delivered by a [`FilesetResolver`](crate::fileset::FilesetResolver)
/// and may be replaced at any time by a newer delivery for the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fileset {
    ref_id: String,
    files: Arc<[PathBuf]>,
}

impl Fileset {
    /// Create a fileset value for `ref_id` with the given member files.
    pub fn new(ref_id: impl Into<String>, files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            ref_id: ref_id.into(),
            files: files.into_iter().collect(),
        }
    }

    /// A fileset with no members.
    pub fn empty(ref_id: impl Into<String>) -> Self {
        Self::new(ref_id, std::iter::empty())
    }

    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }

    /// Member files, in resolver order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fileset_members() {
        let fs = Fileset::new("deps", [PathBuf::from("a.jar"), PathBuf::from("b.jar")]);
        assert_eq!(fs.ref_id(), "deps");
        assert_eq!(fs.len(), 2);
        assert_eq!(fs.files()[1], PathBuf::from("b.jar"));
    }

    #[test]
    fn test_empty_fileset() {
        let fs = Fileset::empty("none");
        assert!(fs.is_empty());
    }
}

//! Glob-based fileset definitions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::warn;

use crate::content::Fileset;

/// Pattern used when a definition has no includes.
const DEFAULT_INCLUDE: &str = "*";

/// A fileset described as a base directory plus include/exclude globs.
///
/// Patterns are relative to `dir`. A file is a member if it matches any
/// include and no exclude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesetDefinition {
    dir: PathBuf,
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl FilesetDefinition {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Scan the filesystem and produce the current fileset value for `ref_id`.
    ///
    /// Invalid patterns and unreadable entries are skipped with a warning.
    /// Members are sorted and unique.
    pub fn resolve(&self, ref_id: &str) -> Fileset {
        let excludes: Vec<Pattern> = self
            .excludes
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(fileset = ref_id, pattern = %p, error = %e, "Invalid exclude pattern");
                    None
                }
            })
            .collect();

        let includes: Vec<&str> = if self.includes.is_empty() {
            vec![DEFAULT_INCLUDE]
        } else {
            self.includes.iter().map(String::as_str).collect()
        };

        let Some(dir) = self.dir.to_str() else {
            warn!(fileset = ref_id, dir = %self.dir.display(), "Non UTF-8 fileset directory");
            return Fileset::new(ref_id, Vec::<PathBuf>::new());
        };
        // The directory is literal; only the include is a pattern.
        let base = Pattern::escape(dir);

        let mut members = BTreeSet::new();
        for include in includes {
            let full = Path::new(&base).join(include);
            let Some(full) = full.to_str() else {
                warn!(fileset = ref_id, pattern = include, "Non UTF-8 fileset pattern");
                continue;
            };

            let paths = match glob::glob(full) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(fileset = ref_id, pattern = include, error = %e, "Invalid include pattern");
                    continue;
                }
            };

            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() && !self.is_excluded(&path, &excludes) => {
                        members.insert(path);
                    }
                    Ok(_) => {}
                    Err(e) => warn!(fileset = ref_id, error = %e, "Unreadable fileset entry"),
                }
            }
        }

        Fileset::new(ref_id, members)
    }

    fn is_excluded(&self, path: &Path, excludes: &[Pattern]) -> bool {
        let relative = path.strip_prefix(&self.dir).unwrap_or(path);
        excludes.iter().any(|p| p.matches_path(relative))
    }
}

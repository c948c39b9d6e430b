//! Ini-based library configuration files.
//!
//! ```ini
//! [library]
//! id = shared
//! name = Shared Library
//! fileRef = api
//! folderRef = classes
//! filesetRef = deps
//! apiTypeVisibility = spec, api
//! cache_dir = /var/cache/sharedlib
//!
//! [file.api]
//! path = lib/api.jar
//!
//! [folder.classes]
//! path = build/classes
//!
//! [fileset.deps]
//! dir = lib
//! includes = *.jar
//! excludes = *-sources.jar
//! ```
//!
//! Relative paths are resolved against the directory containing the file.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::{split_list, ConfigError, ConfigSnapshot, Properties, PropertyValue};
use crate::content::FsPathResolver;
use crate::fileset::FilesetDefinition;

const LIBRARY_SECTION: &str = "library";
const FILE_PREFIX: &str = "file.";
const FOLDER_PREFIX: &str = "folder.";
const FILESET_PREFIX: &str = "fileset.";

/// A parsed library configuration file.
#[derive(Debug, Clone)]
pub struct LibraryConfigFile {
    /// Snapshot built from the `[library]` section.
    pub snapshot: ConfigSnapshot,

    /// File and folder reference table from `[file.*]` / `[folder.*]`.
    pub paths: FsPathResolver,

    /// Fileset definitions from `[fileset.*]`, in file order.
    pub filesets: Vec<(String, FilesetDefinition)>,

    /// Cache root override.
    pub cache_dir: Option<PathBuf>,
}

impl LibraryConfigFile {
    /// Load and parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&contents, &base_dir)
    }

    /// Parse config file contents, resolving relative paths against `base_dir`.
    pub fn parse(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let library = ini
            .section(Some(LIBRARY_SECTION))
            .ok_or_else(|| ConfigError::MissingSection(LIBRARY_SECTION.to_string()))?;

        let props: Properties = library
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::from(v)))
            .collect();
        let snapshot = ConfigSnapshot::from_properties(&props)?;
        let cache_dir = library.get("cache_dir").map(|d| base_dir.join(d.trim()));

        let mut paths = FsPathResolver::new();
        let mut filesets = Vec::new();

        for (name, section) in ini.iter() {
            let Some(name) = name else { continue };

            if let Some(id) = name.strip_prefix(FILE_PREFIX) {
                let path = required(section, name, "path")?;
                paths = paths.with_file(id, base_dir.join(path));
            } else if let Some(id) = name.strip_prefix(FOLDER_PREFIX) {
                let path = required(section, name, "path")?;
                paths = paths.with_folder(id, base_dir.join(path));
            } else if let Some(id) = name.strip_prefix(FILESET_PREFIX) {
                let dir = required(section, name, "dir")?;
                let mut definition = FilesetDefinition::new(base_dir.join(dir));
                for pattern in section.get("includes").map(split_list).into_iter().flatten() {
                    definition = definition.with_include(pattern);
                }
                for pattern in section.get("excludes").map(split_list).into_iter().flatten() {
                    definition = definition.with_exclude(pattern);
                }
                filesets.push((id.to_string(), definition));
            }
        }

        Ok(Self {
            snapshot,
            paths,
            filesets,
            cache_dir,
        })
    }

    /// Fileset references in the snapshot with no `[fileset.*]` definition.
    pub fn undefined_filesets(&self) -> Vec<&str> {
        self.snapshot
            .fileset_refs()
            .iter()
            .filter(|r| !self.filesets.iter().any(|(id, _)| id == *r))
            .map(String::as_str)
            .collect()
    }
}

fn required<'a>(
    section: &'a ini::Properties,
    name: &str,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingKey {
            section: name.to_string(),
            key,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PathResolver;

    const SAMPLE: &str = r#"
[library]
id = shared
name = Shared Library
fileRef = api
folderRef = classes
filesetRef = deps, plugins
cache_dir = cache

[file.api]
path = lib/api.jar

[folder.classes]
path = build/classes

[fileset.deps]
dir = lib
includes = *.jar, *.zip
excludes = *-sources.jar
"#;

    #[test]
    fn test_parse_sample() {
        let file = LibraryConfigFile::parse(SAMPLE, Path::new("/srv/app")).unwrap();

        assert_eq!(file.snapshot.id(), "shared");
        assert_eq!(file.snapshot.fileset_refs(), ["deps", "plugins"]);
        assert_eq!(file.cache_dir, Some(PathBuf::from("/srv/app/cache")));
        assert_eq!(
            file.paths.file_path("api"),
            Some(Path::new("/srv/app/lib/api.jar"))
        );
        assert_eq!(
            file.paths.folder_path("classes"),
            Some(Path::new("/srv/app/build/classes"))
        );

        assert_eq!(file.filesets.len(), 1);
        let (id, def) = &file.filesets[0];
        assert_eq!(id, "deps");
        assert_eq!(def.dir(), Path::new("/srv/app/lib"));
        assert_eq!(def.includes(), ["*.jar", "*.zip"]);
        assert_eq!(def.excludes(), ["*-sources.jar"]);
    }

    #[test]
    fn test_undefined_filesets() {
        let file = LibraryConfigFile::parse(SAMPLE, Path::new("/srv/app")).unwrap();
        assert_eq!(file.undefined_filesets(), vec!["plugins"]);
    }

    #[test]
    fn test_missing_library_section() {
        let err = LibraryConfigFile::parse("[file.a]\npath = a.jar\n", Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(s) if s == "library"));
    }

    #[test]
    fn test_fileset_requires_dir() {
        let contents = "[library]\nid = x\n\n[fileset.deps]\nincludes = *.jar\n";
        let err = LibraryConfigFile::parse(contents, Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "dir", .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let lib_dir = dir.path().join("lib");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(lib_dir.join("api.jar"), b"jar").unwrap();
        let config_path = dir.path().join("library.ini");
        std::fs::write(&config_path, "[library]\nid = x\nfileRef = api\n\n[file.api]\npath = lib/api.jar\n").unwrap();

        let file = LibraryConfigFile::load(&config_path).unwrap();
        assert_eq!(file.paths.resolve_file("api"), Some(lib_dir.join("api.jar")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LibraryConfigFile::load(Path::new("/nonexistent/library.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning configuration input into a snapshot.
///
/// Reference errors (a file or folder that does not exist) are not
/// configuration errors: they are recovered while building a generation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The snapshot has no library id.
    #[error("Library configuration is missing an id")]
    MissingId,

    /// An API type in the visibility list is not recognised.
    #[error("Unknown API type '{0}' (expected one of: spec, platform-api, api, stable, third-party)")]
    UnknownApiType(String),

    /// A required ini section is absent.
    #[error("Missing [{0}] section")]
    MissingSection(String),

    /// A required key is absent from a section.
    #[error("Section [{section}] is missing key '{key}'")]
    MissingKey { section: String, key: &'static str },

    /// The config file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid ini.
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_display() {
        let err = ConfigError::MissingKey {
            section: "fileset.deps".to_string(),
            key: "dir",
        };
        assert_eq!(err.to_string(), "Section [fileset.deps] is missing key 'dir'");
    }

    #[test]
    fn test_unknown_api_type_display() {
        let err = ConfigError::UnknownApiType("internal".to_string());
        assert!(err.to_string().contains("'internal'"));
    }
}
